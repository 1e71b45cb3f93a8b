use overstats_sync::FieldChange;

/// Signed delta with an explicit `+` for gains.
pub fn format_signed(delta: i64) -> String {
    if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

/// Trend marker for a delta.
pub fn trend_marker(delta: i64) -> &'static str {
    match delta {
        d if d > 0 => "📈",
        0 => "—",
        _ => "📉",
    }
}

/// One `old | new | delta` line of a session report.
pub fn format_change(change: &FieldChange) -> String {
    format!(
        "`{} | {} | {}` {}",
        change.old,
        change.new,
        format_signed(change.delta),
        trend_marker(change.delta)
    )
}

/// Win rate in percent, or `None` before any game was played.
pub fn win_rate(wins: i64, games: i64) -> Option<f64> {
    if games <= 0 {
        return None;
    }
    Some(wins as f64 / games as f64 * 100.0)
}

/// `Top 12.50%` style label for a percentile.
pub fn format_percentile(percentile: f64) -> String {
    format!("Top {:.2}%", percentile.clamp(0.0, 100.0))
}

/// Title-case a hero key such as `soldier76` or `wreckingBall`.
pub fn hero_display_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for (idx, ch) in key.chars().enumerate() {
        if idx == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_ascii_uppercase() {
            out.push(' ');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use overstats_sync::FieldChange;

    use super::{format_change, format_percentile, format_signed, hero_display_name, win_rate};

    #[test]
    fn signed_deltas() {
        assert_eq!(format_signed(5), "+5");
        assert_eq!(format_signed(0), "0");
        assert_eq!(format_signed(-12), "-12");
    }

    #[test]
    fn change_lines_show_trend() {
        let gain = FieldChange {
            old: 2500,
            new: 2600,
            delta: 100,
        };
        assert_eq!(format_change(&gain), "`2500 | 2600 | +100` 📈");

        let flat = FieldChange {
            old: 5,
            new: 5,
            delta: 0,
        };
        assert_eq!(format_change(&flat), "`5 | 5 | 0` —");

        let drop = FieldChange {
            old: 2600,
            new: 2575,
            delta: -25,
        };
        assert_eq!(format_change(&drop), "`2600 | 2575 | -25` 📉");
    }

    #[test]
    fn win_rate_needs_games() {
        assert_eq!(win_rate(3, 0), None);
        assert_eq!(win_rate(5, 10), Some(50.0));
    }

    #[test]
    fn percentile_labels() {
        assert_eq!(format_percentile(12.5), "Top 12.50%");
        assert_eq!(format_percentile(130.0), "Top 100.00%");
    }

    #[test]
    fn hero_names() {
        assert_eq!(hero_display_name("wreckingBall"), "Wrecking Ball");
        assert_eq!(hero_display_name("soldier76"), "Soldier76");
        assert_eq!(hero_display_name(""), "");
    }
}
