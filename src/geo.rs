/// Great-circle distance between two WGS84 points in meters.
///
/// Haversine over a spherical earth. Accurate to well under a meter at the
/// distances this service cares about (stop radii and route segments).
/// Rounded to centimeters so equal inputs compare equal downstream.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    let meters = EARTH_RADIUS_M * c;
    (meters * 100.0).round() / 100.0
}
