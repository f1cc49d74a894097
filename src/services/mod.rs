pub(crate) mod answer_payload;
pub(crate) mod drawing;
pub(crate) mod grading;
pub(crate) mod timing;
