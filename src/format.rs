//! Currency and percent formatting
//!
//! Mirrors en-US number formatting: symbol prefix, comma grouping,
//! fixed fraction digits, `-` ahead of the symbol for negatives.

/// How a currency amount is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: &'static str,
    pub fraction_digits: u32,
}

impl CurrencyFormat {
    pub const USD: CurrencyFormat = CurrencyFormat { symbol: "$", fraction_digits: 2 };
    pub const EUR: CurrencyFormat = CurrencyFormat { symbol: "€", fraction_digits: 2 };
    pub const GBP: CurrencyFormat = CurrencyFormat { symbol: "£", fraction_digits: 2 };
    pub const JPY: CurrencyFormat = CurrencyFormat { symbol: "¥", fraction_digits: 0 };

    /// Look up a preset by ISO 4217 code. Unknown codes get USD.
    pub fn for_code(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "EUR" => Self::EUR,
            "GBP" => Self::GBP,
            "JPY" => Self::JPY,
            _ => Self::USD,
        }
    }

    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return format!("{}NaN", self.symbol);
        }

        let sign = if value.is_sign_negative() && value != 0.0 { "-" } else { "" };

        if value.is_infinite() {
            return format!("{}{}∞", sign, self.symbol);
        }

        let scale = 10f64.powi(self.fraction_digits as i32);
        // f64::round is half away from zero
        let scaled = (value.abs() * scale).round();
        let whole = (scaled / scale).trunc();
        let fraction = (scaled - whole * scale).round() as u64;

        let mut out = String::with_capacity(24);
        out.push_str(sign);
        out.push_str(self.symbol);
        out.push_str(&group_thousands(&format!("{:.0}", whole)));

        if self.fraction_digits > 0 {
            out.push('.');
            out.push_str(&format!(
                "{:0width$}",
                fraction,
                width = self.fraction_digits as usize
            ));
        }

        // Rounded-away amounts like -0.001 print without a sign
        if scaled == 0.0 && !sign.is_empty() {
            return out.trim_start_matches('-').to_string();
        }

        out
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::USD
    }
}

/// Format an amount as US dollars, e.g. `$1,234.50`.
pub fn format_currency(value: f64) -> String {
    CurrencyFormat::USD.format(value)
}

/// Shortest numeric form followed by `%`, e.g. `7.23%` or `7%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", value)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
