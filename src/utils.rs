use chrono::{DateTime, Local, Utc};

/// MIST per SUI (nine implied decimals).
pub const MIST_PER_SUI: u64 = 1_000_000_000;

/// Decimal places carried by one MIST.
pub const SUI_DECIMALS: usize = 9;

/// Convert a decimal SUI string to MIST using exact decimal arithmetic.
///
/// Accepts digits with at most one decimal point (`"1"`, `"0.25"`, `".5"`, `"3."`).
/// Digits past the ninth decimal place are dropped, never rounded.
/// Returns `None` for signs, exponents, separators, trailing text, or overflow.
pub fn sui_str_to_mist(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole_mist = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().ok()?.checked_mul(MIST_PER_SUI)?
    };

    let kept = &frac[..frac.len().min(SUI_DECIMALS)];
    let frac_mist = if kept.is_empty() {
        0
    } else {
        // right-pad to nine digits: "25" -> 250_000_000
        format!("{:0<width$}", kept, width = SUI_DECIMALS).parse::<u64>().ok()?
    };

    whole_mist.checked_add(frac_mist)
}

/// True when the input has more fractional digits than one MIST can express.
pub fn has_sub_mist_precision(input: &str) -> bool {
    input
        .trim()
        .split_once('.')
        .map(|(_, frac)| frac.trim_end_matches('0').len() > SUI_DECIMALS)
        .unwrap_or(false)
}

/// Format MIST as SUI with four decimals, rounding half up.
pub fn format_sui(mist: u64) -> String {
    let ten_thousandths = (mist as u128 + 50_000) / 100_000;
    format!("{}.{:04}", ten_thousandths / 10_000, ten_thousandths % 10_000)
}

/// Shorten an address for display: `0x1234...abcd`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Render a millisecond epoch timestamp in local time.
pub fn format_timestamp_ms(timestamp_ms: u64) -> String {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
