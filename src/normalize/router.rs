use super::CanonicalField;

/// Where a raw label's value goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Copied as-is into one canonical field.
    Field(CanonicalField),
    /// Split into City / State / ZipCode.
    Address,
    /// Normalized to `YYYY-MM-DD`.
    Date,
}

/// Label markers in evaluation order. Labels are not disjoint ("Business name"
/// also contains "Name"), so the first containing marker wins.
pub const ROUTES: &[(&str, Route)] = &[
    ("Name", Route::Field(CanonicalField::EntityName)),
    ("Business name", Route::Field(CanonicalField::BusinessName)),
    ("City, state, and ZIP code", Route::Address),
    ("Employer identification number", Route::Field(CanonicalField::Ein)),
    ("Social security number", Route::Field(CanonicalField::Ssn)),
    ("Date", Route::Date),
    ("Signature", Route::Field(CanonicalField::Signature)),
    ("Address", Route::Field(CanonicalField::Address)),
];

/// Route a label by case-sensitive substring containment, or `None` to drop it.
pub fn route(label: &str) -> Option<Route> {
    ROUTES
        .iter()
        .find(|(marker, _)| label.contains(marker))
        .map(|(_, route)| *route)
}
