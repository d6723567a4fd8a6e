//! Typed records, creation payloads and partial-update patches.
//!
//! Patches follow "absent means unchanged". Nullable columns use a tri-state
//! `Option<Option<T>>`: absent leaves the column alone, `null` clears it and a
//! value replaces it. `created_at`/`updated_at` are owned by the store and never
//! appear in a patch.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

pub fn date_text(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub fn time_text(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Students

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: String,
    pub last_name: String,
    pub first_name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub birth_judgment: Option<String>,
    pub birth_certificate_type: Option<String>,
    pub registration_year: Option<i64>,
    pub birth_certificate_number: Option<String>,
    pub birth_place: Option<String>,
    pub academic_year: Option<String>,
    pub section: Option<String>,
    pub class_number: Option<String>,
    pub study_system: Option<String>,
    pub registration_number: Option<i64>,
    pub registration_date: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub student_id: String,
    pub last_name: String,
    pub first_name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub birth_judgment: Option<String>,
    pub birth_certificate_type: Option<String>,
    pub registration_year: Option<i64>,
    pub birth_certificate_number: Option<String>,
    pub birth_place: Option<String>,
    pub academic_year: Option<String>,
    pub section: Option<String>,
    pub class_number: Option<String>,
    pub study_system: Option<String>,
    pub registration_number: Option<i64>,
    pub registration_date: Option<NaiveDate>,
}

impl NewStudent {
    pub fn new(
        student_id: impl Into<String>,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        gender: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            gender: gender.into(),
            birth_date,
            birth_judgment: None,
            birth_certificate_type: None,
            registration_year: None,
            birth_certificate_number: None,
            birth_place: None,
            academic_year: None,
            section: None,
            class_number: None,
            study_system: None,
            registration_number: None,
            registration_date: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudentPatch {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub birth_judgment: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub birth_certificate_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub registration_year: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub birth_certificate_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub birth_place: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub academic_year: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub section: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub class_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub study_system: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub registration_number: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub registration_date: Option<Option<NaiveDate>>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Teachers and staff

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub teacher_id: i64,
    pub last_name: String,
    pub first_name: String,
    pub gender: String,
    pub birth_date: Option<NaiveDate>,
    pub specialization: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeacher {
    pub last_name: String,
    pub first_name: String,
    pub gender: String,
    pub birth_date: Option<NaiveDate>,
    pub specialization: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TeacherPatch {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub specialization: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub hire_date: Option<Option<NaiveDate>>,
}

impl TeacherPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub staff_id: i64,
    pub last_name: String,
    pub first_name: String,
    pub gender: String,
    pub birth_date: Option<NaiveDate>,
    pub job_title: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaffMember {
    pub last_name: String,
    pub first_name: String,
    pub gender: String,
    pub birth_date: Option<NaiveDate>,
    pub job_title: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StaffPatch {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub hire_date: Option<Option<NaiveDate>>,
}

impl StaffPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Medical certificates

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalCertificate {
    pub certificate_id: i64,
    pub student_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub receipt_date: NaiveDate,
    pub school_doctor_verified: bool,
    pub parent_delivered: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCertificate {
    pub student_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub receipt_date: NaiveDate,
    #[serde(default)]
    pub school_doctor_verified: bool,
    #[serde(default)]
    pub parent_delivered: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CertificatePatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub receipt_date: Option<NaiveDate>,
    pub school_doctor_verified: Option<bool>,
    pub parent_delivered: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl CertificatePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Actions and behavior reports

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub action_id: i64,
    pub action_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorReport {
    pub report_id: i64,
    pub student_id: String,
    pub reporter_name: String,
    pub reporter_role: String,
    pub specialization: Option<String>,
    pub report_date: NaiveDate,
    pub report_time: NaiveTime,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub student_id: String,
    pub reporter_name: String,
    pub reporter_role: String,
    pub specialization: Option<String>,
    pub report_date: NaiveDate,
    pub report_time: NaiveTime,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReportPatch {
    pub reporter_name: Option<String>,
    pub reporter_role: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub specialization: Option<Option<String>>,
    pub report_date: Option<NaiveDate>,
    pub report_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl ReportPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Summon details carried by a report create/update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonPayload {
    pub parent_name: String,
    pub summoner_name: String,
    pub summon_date: NaiveDate,
    pub summon_time: NaiveTime,
    pub attended: Option<bool>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Parent summons

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSummon {
    pub summon_id: i64,
    pub student_id: String,
    pub parent_name: String,
    pub summoner_name: String,
    pub summon_date: NaiveDate,
    pub summon_time: NaiveTime,
    pub attended: bool,
    pub report_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSummon {
    pub student_id: String,
    pub parent_name: String,
    pub summoner_name: String,
    pub summon_date: NaiveDate,
    pub summon_time: NaiveTime,
    #[serde(default)]
    pub attended: bool,
    pub notes: Option<String>,
    pub report_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SummonPatch {
    pub parent_name: Option<String>,
    pub summoner_name: Option<String>,
    pub summon_date: Option<NaiveDate>,
    pub summon_time: Option<NaiveTime>,
    pub attended: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub report_id: Option<Option<i64>>,
}

impl SummonPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Joined views

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateView {
    #[serde(flatten)]
    pub certificate: MedicalCertificate,
    pub student_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    #[serde(flatten)]
    pub report: BehaviorReport,
    pub student_name: String,
    pub actions: Vec<String>,
    pub summon: Option<ParentSummon>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonView {
    #[serde(flatten)]
    pub summon: ParentSummon,
    pub student_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_distinguishes_absent_null_and_value() {
        let patch: StudentPatch = serde_json::from_value(json!({
            "section": null,
            "birthPlace": "Oran"
        }))
        .expect("parse patch");
        assert_eq!(patch.section, Some(None));
        assert_eq!(patch.birth_place, Some(Some("Oran".to_string())));
        assert_eq!(patch.class_number, None);
        assert!(!patch.is_empty());
        assert!(StudentPatch::default().is_empty());
    }

    #[test]
    fn patch_rejects_store_owned_timestamps() {
        let res = serde_json::from_value::<TeacherPatch>(json!({
            "updatedAt": "2024-01-01T00:00:00Z"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn new_summon_defaults_to_pending() {
        let s: NewSummon = serde_json::from_value(json!({
            "studentId": "S1",
            "parentName": "X",
            "summonerName": "Y",
            "summonDate": "2023-10-02",
            "summonTime": "09:30:00"
        }))
        .expect("parse summon");
        assert!(!s.attended);
        assert_eq!(s.report_id, None);
    }
}
