/// Columns expected in the raw loan source, in source order.
/// `purpose`/`purpose2` are a split pair that is merged during
/// standardization; `annual_income` is dropped before finalization.
pub const RAW_COLUMNS: [&str; 17] = [
    "id",
    "loan_amount",
    "term",
    "interest_rate",
    "installment",
    "grade",
    "sub_grade",
    "employee_length",
    "home_ownership",
    "annual_income",
    "issue_date",
    "loan_status",
    "purpose",
    "purpose2",
    "address_state",
    "debt_to_income",
    "total_payment",
];

/// The finalized schema the reporting layer binds to. Downstream queries
/// key on these names, so any deviation is a hard failure.
pub const FINAL_COLUMNS: [&str; 15] = [
    "id",
    "loan_amount",
    "term",
    "interest_rate",
    "installment",
    "grade",
    "sub_grade",
    "employee_length",
    "home_ownership",
    "issue_date",
    "loan_status",
    "purpose",
    "address_state",
    "debt_to_income",
    "total_payment",
];

/// Numeric columns that must never hold a negative value.
pub const SIGN_CHECKED_COLUMNS: [&str; 5] = [
    "loan_amount",
    "interest_rate",
    "installment",
    "debt_to_income",
    "total_payment",
];

pub const DATE_COLUMN: &str = "issue_date";
