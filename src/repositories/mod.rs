pub(crate) mod answers;
pub(crate) mod attempt_questions;
pub(crate) mod attempts;
pub(crate) mod case_studies;
pub(crate) mod exams;
pub(crate) mod hotspot_areas;
pub(crate) mod options;
pub(crate) mod questions;
pub(crate) mod users;
