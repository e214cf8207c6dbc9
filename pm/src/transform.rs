//! Field transformation rules for visits rows
//!
//! Each optional field is parsed on its own; a malformed value becomes `None`
//! without affecting the rest of the row. Gestational week and day are the
//! exception: a non-empty value that is not an integer aborts the run.

use log::debug;

use crate::error::Result;
use crate::legacy::{RawVisit, required_int};

/// Fundal height the legacy system stored when the field was never filled in
pub const FUNDAL_HEIGHT_UNSET: &str = "12.0";

/// A visit in the `consultasPrenatal` column set
#[derive(Debug, Clone, PartialEq)]
pub struct VisitRecord {
    /// `gestanteId`
    pub patient_id: i64,
    /// `dataConsulta`, date part only
    pub visit_date: Option<String>,
    /// `igSemanas`
    pub gestational_weeks: Option<i32>,
    /// `igDias`
    pub gestational_days: Option<i32>,
    /// `peso`, in grams
    pub weight_grams: Option<i64>,
    /// `pressaoArterial`, "systolic/diastolic"
    pub blood_pressure: Option<String>,
    /// `alturaUterina`, in cm
    pub fundal_height: Option<i64>,
    /// `bcf`
    pub fetal_heartbeat: bool,
    /// `mf`
    pub fetal_movement: bool,
    /// `observacoes`
    pub notes: Option<String>,
}

impl VisitRecord {
    /// Transform a raw visits row for the already resolved `patient_id`
    pub fn from_raw(patient_id: i64, raw: &RawVisit) -> Result<Self> {
        Ok(Self {
            patient_id,
            visit_date: visit_date(raw.get(RawVisit::DATE)),
            gestational_weeks: optional_int(raw, RawVisit::GESTATIONAL_WEEK, "igSemanas")?,
            gestational_days: optional_int(raw, RawVisit::GESTATIONAL_DAY, "igDias")?,
            weight_grams: weight_grams(raw.get(RawVisit::WEIGHT)),
            blood_pressure: blood_pressure(raw.get(RawVisit::SYSTOLIC), raw.get(RawVisit::DIASTOLIC)),
            fundal_height: fundal_height(raw.get(RawVisit::FUNDAL_HEIGHT)),
            fetal_heartbeat: flag(raw.get(RawVisit::FETAL_HEARTBEAT)),
            fetal_movement: flag(raw.get(RawVisit::FETAL_MOVEMENT)),
            notes: non_empty(raw.get(RawVisit::NOTES)),
        })
    }
}

fn non_empty(raw: &str) -> Option<String> {
    if raw.is_empty() { None } else { Some(raw.to_string()) }
}

fn optional_int(raw: &RawVisit, index: usize, field: &'static str) -> Result<Option<i32>> {
    let value = raw.get(index);
    if value.is_empty() {
        return Ok(None);
    }
    required_int(raw.source(), raw.line(), field, value).map(Some)
}

/// Date part of a "date time" value
pub fn visit_date(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    raw.split(' ').next().map(str::to_string)
}

/// Strip `suffix`, accept a comma decimal separator and parse as float
fn measurement(raw: &str, suffix: &str) -> Option<f64> {
    let value = raw.replace(suffix, "").replace(',', ".");
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            debug!("Ignoring unparseable measurement {:?}", raw);
            None
        }
    }
}

/// Weight in kilograms ("72,5kg") to whole grams, truncated
pub fn weight_grams(raw: &str) -> Option<i64> {
    if raw.is_empty() {
        return None;
    }
    measurement(raw, "kg").map(|kg| (kg * 1000.0) as i64)
}

/// Fundal height in whole centimetres, truncated
pub fn fundal_height(raw: &str) -> Option<i64> {
    if raw.is_empty() || raw == FUNDAL_HEIGHT_UNSET {
        return None;
    }
    measurement(raw, "cm").map(|cm| cm as i64)
}

pub fn blood_pressure(systolic: &str, diastolic: &str) -> Option<String> {
    if systolic.is_empty() || diastolic.is_empty() {
        return None;
    }
    Some(format!("{}/{}", systolic, diastolic))
}

/// Only the literal "1" is a positive observation
pub fn flag(raw: &str) -> bool {
    raw == "1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrateError;
    use proptest::prelude::*;
    use std::path::Path;

    fn raw(fields: [&str; 12]) -> RawVisit {
        RawVisit::from_fields(Path::new("consultas.csv"), 4, fields).unwrap()
    }

    #[test]
    fn test_weight() {
        assert_eq!(weight_grams("72,5kg"), Some(72500));
        assert_eq!(weight_grams("72.5"), Some(72500));
        assert_eq!(weight_grams("80kg"), Some(80000));
        assert_eq!(weight_grams(" 65 kg"), Some(65000));
        assert_eq!(weight_grams("abc"), None);
        assert_eq!(weight_grams(""), None);
        assert_eq!(weight_grams("nan"), None);
    }

    #[test]
    fn test_fundal_height() {
        assert_eq!(fundal_height("12.0"), None);
        assert_eq!(fundal_height("30cm"), Some(30));
        assert_eq!(fundal_height("28,5cm"), Some(28));
        assert_eq!(fundal_height("12"), Some(12));
        assert_eq!(fundal_height("n/a"), None);
        assert_eq!(fundal_height(""), None);
    }

    #[test]
    fn test_blood_pressure() {
        assert_eq!(blood_pressure("120", "80"), Some("120/80".to_string()));
        assert_eq!(blood_pressure("", "80"), None);
        assert_eq!(blood_pressure("120", ""), None);
    }

    #[test]
    fn test_visit_date_truncation() {
        assert_eq!(visit_date("2024-03-01 10:30:00"), Some("2024-03-01".to_string()));
        assert_eq!(visit_date("2024-03-01"), Some("2024-03-01".to_string()));
        assert_eq!(visit_date(""), None);
    }

    #[test]
    fn test_flags() {
        assert!(flag("1"));
        assert!(!flag("0"));
        assert!(!flag("true"));
        assert!(!flag(""));
    }

    #[test]
    fn test_from_raw_full_row() {
        let visit = raw([
            "10",
            "5",
            "2024-03-01 10:30:00",
            "20",
            "3",
            "72,5kg",
            "120",
            "80",
            "30cm",
            "1",
            "0",
            "Sem queixas",
        ]);

        let record = VisitRecord::from_raw(42, &visit).unwrap();
        assert_eq!(
            record,
            VisitRecord {
                patient_id: 42,
                visit_date: Some("2024-03-01".to_string()),
                gestational_weeks: Some(20),
                gestational_days: Some(3),
                weight_grams: Some(72500),
                blood_pressure: Some("120/80".to_string()),
                fundal_height: Some(30),
                fetal_heartbeat: true,
                fetal_movement: false,
                notes: Some("Sem queixas".to_string()),
            }
        );
    }

    #[test]
    fn test_from_raw_empty_optionals() {
        let visit = raw(["10", "5", "", "", "", "", "", "", "12.0", "", "", ""]);

        let record = VisitRecord::from_raw(7, &visit).unwrap();
        assert_eq!(record.visit_date, None);
        assert_eq!(record.gestational_weeks, None);
        assert_eq!(record.gestational_days, None);
        assert_eq!(record.weight_grams, None);
        assert_eq!(record.blood_pressure, None);
        assert_eq!(record.fundal_height, None);
        assert!(!record.fetal_heartbeat);
        assert!(!record.fetal_movement);
        assert_eq!(record.notes, None);
    }

    #[test]
    fn test_from_raw_bad_gestational_week_is_fatal() {
        let visit = raw(["10", "5", "", "vinte", "", "", "", "", "", "", "", ""]);

        let err = VisitRecord::from_raw(7, &visit).unwrap_err();
        match err {
            MigrateError::InvalidInteger { line, field, value, .. } => {
                assert_eq!(line, 4);
                assert_eq!(field, "igSemanas");
                assert_eq!(value, "vinte");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_raw_bad_gestational_day_is_fatal() {
        let visit = raw(["10", "5", "", "20", "x", "", "", "", "", "", "", ""]);

        let err = VisitRecord::from_raw(7, &visit).unwrap_err();
        match err {
            MigrateError::InvalidInteger { line, field, value, .. } => {
                assert_eq!(line, 4);
                assert_eq!(field, "igDias");
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    proptest! {
        #[test]
        fn prop_weight_never_panics(input in ".*") {
            let _ = weight_grams(&input);
        }

        #[test]
        fn prop_fundal_height_never_panics(input in ".*") {
            let _ = fundal_height(&input);
        }

        #[test]
        fn prop_weight_whole_kilograms(kg in 1u32..300) {
            prop_assert_eq!(weight_grams(&format!("{}kg", kg)), Some(i64::from(kg) * 1000));
            prop_assert_eq!(weight_grams(&format!("{},0", kg)), Some(i64::from(kg) * 1000));
        }
    }
}
