//! State → city table shared by the generator and the dataset verifier.

/// Every state the dataset covers, with the cities a record may name for it.
pub static STATE_CITIES: [(&str, [&str; 4]); 10] = [
    ("CA", ["Los Angeles", "San Francisco", "San Diego", "Sacramento"]),
    ("NY", ["New York", "Buffalo", "Rochester", "Albany"]),
    ("TX", ["Houston", "Dallas", "Austin", "San Antonio"]),
    ("FL", ["Miami", "Orlando", "Tampa", "Jacksonville"]),
    ("IL", ["Chicago", "Springfield", "Naperville", "Rockford"]),
    ("PA", ["Philadelphia", "Pittsburgh", "Allentown", "Erie"]),
    ("OH", ["Columbus", "Cleveland", "Cincinnati", "Toledo"]),
    ("GA", ["Atlanta", "Savannah", "Augusta", "Athens"]),
    ("NC", ["Charlotte", "Raleigh", "Greensboro", "Durham"]),
    ("MI", ["Detroit", "Grand Rapids", "Lansing", "Ann Arbor"]),
];

/// Cities listed for `state`, or `None` for an unknown state code.
pub fn cities_for(state: &str) -> Option<&'static [&'static str]> {
    STATE_CITIES
        .iter()
        .find(|(code, _)| *code == state)
        .map(|(_, cities)| &cities[..])
}

pub fn is_city_in_state(state: &str, city: &str) -> bool {
    cities_for(state).is_some_and(|cities| cities.contains(&city))
}
