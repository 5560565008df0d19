//! Built-in country distance table, used when no distance is configured

/// Approximate road/sea distances in km between country pairs. Symmetric.
const STATIC_DISTANCES: &[(&str, &str, u32)] = &[
	("FR", "DE", 1050),
	("FR", "ES", 1270),
	("FR", "IT", 1420),
	("FR", "BE", 310),
	("FR", "NL", 500),
	("FR", "GB", 460),
	("FR", "CH", 570),
	("FR", "PT", 1740),
	("FR", "PL", 1590),
	("DE", "NL", 660),
	("DE", "BE", 780),
	("DE", "PL", 570),
	("DE", "IT", 1180),
	("DE", "AT", 520),
	("DE", "CH", 750),
	("DE", "DK", 440),
	("DE", "CZ", 350),
	("ES", "PT", 630),
	("ES", "IT", 1960),
	("IT", "AT", 760),
	("NL", "BE", 210),
	("NL", "GB", 540),
	("GB", "IE", 460),
	("PL", "CZ", 520),
	("FR", "MA", 2050),
	("FR", "SN", 4200),
	("FR", "CI", 4900),
	("FR", "CM", 5100),
	("FR", "US", 6200),
	("FR", "CA", 5500),
	("FR", "CN", 8200),
	("FR", "JP", 9700),
	("FR", "BR", 9400),
	("FR", "AE", 5250),
	("DE", "CN", 7350),
	("DE", "US", 6400),
	("US", "CA", 1200),
	("US", "MX", 2500),
	("CN", "JP", 2100),
	("CN", "KR", 950),
];

/// Symmetric lookup in the built-in table
pub fn static_distance_km(origin: &str, destination: &str) -> Option<u32> {
	let origin = origin.trim().to_uppercase();
	let destination = destination.trim().to_uppercase();
	if origin == destination {
		return None;
	}
	STATIC_DISTANCES
		.iter()
		.find(|(a, b, _)| {
			(*a == origin && *b == destination) || (*a == destination && *b == origin)
		})
		.map(|(_, _, km)| *km)
}
