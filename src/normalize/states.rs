//! Static state/region tables used by the address decomposer.
//!
//! Built at compile time with `phf`, so they are immutable and shared by every
//! thread without synchronization.

use phf::{Map, phf_map};

/// Full region name -> two-letter code. U.S. states, DC and Indian
/// states/union territories.
pub static NAME_TO_ABBR: Map<&'static str, &'static str> = phf_map! {
    // United States
    "Alabama" => "AL", "Alaska" => "AK", "Arizona" => "AZ", "Arkansas" => "AR",
    "California" => "CA", "Colorado" => "CO", "Connecticut" => "CT", "Delaware" => "DE",
    "Florida" => "FL", "Georgia" => "GA", "Hawaii" => "HI", "Idaho" => "ID",
    "Illinois" => "IL", "Indiana" => "IN", "Iowa" => "IA", "Kansas" => "KS",
    "Kentucky" => "KY", "Louisiana" => "LA", "Maine" => "ME", "Maryland" => "MD",
    "Massachusetts" => "MA", "Michigan" => "MI", "Minnesota" => "MN", "Mississippi" => "MS",
    "Missouri" => "MO", "Montana" => "MT", "Nebraska" => "NE", "Nevada" => "NV",
    "New Hampshire" => "NH", "New Jersey" => "NJ", "New Mexico" => "NM", "New York" => "NY",
    "North Carolina" => "NC", "North Dakota" => "ND", "Ohio" => "OH", "Oklahoma" => "OK",
    "Oregon" => "OR", "Pennsylvania" => "PA", "Rhode Island" => "RI", "South Carolina" => "SC",
    "South Dakota" => "SD", "Tennessee" => "TN", "Texas" => "TX", "Utah" => "UT",
    "Vermont" => "VT", "Virginia" => "VA", "Washington" => "WA", "West Virginia" => "WV",
    "Wisconsin" => "WI", "Wyoming" => "WY", "District of Columbia" => "DC",

    // India
    "Andhra Pradesh" => "AP", "Arunachal Pradesh" => "AR", "Assam" => "AS", "Bihar" => "BR",
    "Chhattisgarh" => "CG", "Goa" => "GA", "Gujarat" => "GJ", "Haryana" => "HR",
    "Himachal Pradesh" => "HP", "Jharkhand" => "JH", "Karnataka" => "KA", "Kerala" => "KL",
    "Madhya Pradesh" => "MP", "Maharashtra" => "MH", "Manipur" => "MN", "Meghalaya" => "ML",
    "Mizoram" => "MZ", "Nagaland" => "NL", "Odisha" => "OD", "Punjab" => "PB",
    "Rajasthan" => "RJ", "Sikkim" => "SK", "Tamil Nadu" => "TN", "Telangana" => "TG",
    "Tripura" => "TR", "Uttar Pradesh" => "UP", "Uttarakhand" => "UK", "West Bengal" => "WB",
};

/// Codes accepted as already abbreviated, with the region each one reads back
/// to. Several Indian codes collide with U.S. ones (`GA`, `AR`, `MN`, `TN`);
/// those read back to the U.S. state.
pub static ABBREVIATIONS: Map<&'static str, &'static str> = phf_map! {
    "AL" => "Alabama", "AK" => "Alaska", "AZ" => "Arizona", "AR" => "Arkansas",
    "CA" => "California", "CO" => "Colorado", "CT" => "Connecticut", "DE" => "Delaware",
    "FL" => "Florida", "GA" => "Georgia", "HI" => "Hawaii", "ID" => "Idaho",
    "IL" => "Illinois", "IN" => "Indiana", "IA" => "Iowa", "KS" => "Kansas",
    "KY" => "Kentucky", "LA" => "Louisiana", "ME" => "Maine", "MD" => "Maryland",
    "MA" => "Massachusetts", "MI" => "Michigan", "MN" => "Minnesota", "MS" => "Mississippi",
    "MO" => "Missouri", "MT" => "Montana", "NE" => "Nebraska", "NV" => "Nevada",
    "NH" => "New Hampshire", "NJ" => "New Jersey", "NM" => "New Mexico", "NY" => "New York",
    "NC" => "North Carolina", "ND" => "North Dakota", "OH" => "Ohio", "OK" => "Oklahoma",
    "OR" => "Oregon", "PA" => "Pennsylvania", "RI" => "Rhode Island", "SC" => "South Carolina",
    "SD" => "South Dakota", "TN" => "Tennessee", "TX" => "Texas", "UT" => "Utah",
    "VT" => "Vermont", "VA" => "Virginia", "WA" => "Washington", "WV" => "West Virginia",
    "WI" => "Wisconsin", "WY" => "Wyoming", "DC" => "District of Columbia",
    "RJ" => "Rajasthan",
};

/// Whether `candidate` is a full name or accepted code. Case-sensitive.
pub fn is_known(candidate: &str) -> bool {
    NAME_TO_ABBR.contains_key(candidate) || ABBREVIATIONS.contains_key(candidate)
}

/// Full names become their code; codes and anything unrecognized pass through.
pub fn normalize_state(state: &str) -> String {
    match NAME_TO_ABBR.get(state) {
        Some(abbr) => (*abbr).to_string(),
        None => state.to_string(),
    }
}

/// Reverse lookup for an accepted code.
pub fn full_name(abbr: &str) -> Option<&'static str> {
    ABBREVIATIONS.get(abbr).copied()
}
