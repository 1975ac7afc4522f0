pub const MISMATCH_REVIEW_PREFIX: &str =
    "Review the following G703 pay application mismatches:";

pub const MISMATCH_REVIEW_SUFFIX: &str =
    "Explain possible reasons for the mismatches and recommendations.";
