//! Human-readable coordinate and scale formatting for map overlays.

/// Scale bar label per zoom level.
const SCALE_LABELS: [&str; 20] = [
    "5000 Km", "2500 Km", "1500 Km", "700 Km", "350 Km", "150 Km", "100 Km", "40 Km", "20 Km",
    "10 Km", "5 Km", "2,5 Km", "1,5 Km", "700 m", "350 m", "150 m", "80 m", "40 m", "20 m",
    "10 m",
];

/// Scale bar label for `zoom`; zooms beyond the table use the finest label.
pub fn scale_label(zoom: u8) -> &'static str {
    SCALE_LABELS[(zoom as usize).min(SCALE_LABELS.len() - 1)]
}

/// Formats a latitude as `DD° MM' SS.SS" N`.
pub fn format_latitude(lat: f64) -> String {
    format_dms(lat, 'N', 'S')
}

/// Formats a longitude as `DDD° MM' SS.SS" E`.
pub fn format_longitude(lon: f64) -> String {
    format_dms(lon, 'E', 'W')
}

fn format_dms(value: f64, positive: char, negative: char) -> String {
    let hemisphere = if value < 0.0 { negative } else { positive };
    let abs = value.abs();
    let degrees = abs.trunc();
    let minutes_f = (abs - degrees) * 60.0;
    let minutes = minutes_f.trunc();
    let seconds = (minutes_f - minutes) * 60.0;
    format!(
        "{:02}\u{b0} {:02}' {:05.2}\" {}",
        degrees as u32, minutes as u32, seconds, hemisphere
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_label_bounds() {
        assert_eq!(scale_label(0), "5000 Km");
        assert_eq!(scale_label(17), "40 m");
        assert_eq!(scale_label(19), "10 m");
        assert_eq!(scale_label(25), "10 m");
    }

    #[test]
    fn test_format_latitude_south() {
        assert_eq!(format_latitude(-33.5), "33\u{b0} 30' 00.00\" S");
    }

    #[test]
    fn test_format_longitude_east() {
        assert_eq!(format_longitude(2.1234), "02\u{b0} 07' 24.24\" E");
    }
}
