use serde_json::Value;

use super::method;
use crate::error::{EvalError, EvalResult};
use crate::operator::OperatorCall;

/// How a locale writes numbers.
struct NumberSymbols {
  group: &'static str,
  decimal: &'static str,
  /// Groups of two above the first thousand (`12,34,567`).
  indian_grouping: bool,
  /// `12,00 €` rather than `€12.00`.
  currency_suffix: bool,
  currency_space: &'static str,
  percent_space: &'static str,
}

const ENGLISH: NumberSymbols = NumberSymbols {
  group: ",",
  decimal: ".",
  indian_grouping: false,
  currency_suffix: false,
  currency_space: "",
  percent_space: "",
};

const SUPPORTED_OPTIONS: [&str; 5] = [
  "currency",
  "maximumFractionDigits",
  "minimumFractionDigits",
  "style",
  "useGrouping",
];

fn symbols(locale: &str) -> NumberSymbols {
  let exact = match locale {
    "en-IN" => Some(NumberSymbols {
      indian_grouping: true,
      ..ENGLISH
    }),
    "en-ZA" => Some(NumberSymbols {
      group: "\u{a0}",
      decimal: ",",
      currency_space: "\u{a0}",
      ..ENGLISH
    }),
    "en" | "en-US" | "en-GB" => Some(ENGLISH),
    _ => None,
  };
  if let Some(symbols) = exact {
    return symbols;
  }
  let language = locale.split(['-', '_']).next().unwrap_or(locale);
  match language {
    "de" => NumberSymbols {
      group: ".",
      decimal: ",",
      indian_grouping: false,
      currency_suffix: true,
      currency_space: "\u{a0}",
      percent_space: "\u{a0}",
    },
    "pt" => NumberSymbols {
      group: ".",
      decimal: ",",
      indian_grouping: false,
      currency_suffix: true,
      currency_space: "\u{a0}",
      percent_space: "",
    },
    "fr" => NumberSymbols {
      group: "\u{202f}",
      decimal: ",",
      indian_grouping: false,
      currency_suffix: true,
      currency_space: "\u{a0}",
      percent_space: "\u{202f}",
    },
    _ => ENGLISH,
  }
}

/// Symbol and minor unit digits of a currency code.
fn currency(code: &str) -> (String, usize) {
  match code.to_ascii_uppercase().as_str() {
    "USD" => ("$".to_string(), 2),
    "EUR" => ("€".to_string(), 2),
    "GBP" => ("£".to_string(), 2),
    "INR" => ("₹".to_string(), 2),
    "ZAR" => ("R".to_string(), 2),
    "JPY" => ("¥".to_string(), 0),
    other => (other.to_string(), 2),
  }
}

fn group_digits(digits: &str, symbols: &NumberSymbols) -> String {
  let mut groups: Vec<&str> = Vec::new();
  let mut end = digits.len();
  let mut size = 3;
  while end > size {
    groups.push(&digits[end - size..end]);
    end -= size;
    if symbols.indian_grouping {
      size = 2;
    }
  }
  groups.push(&digits[..end]);
  groups.reverse();
  groups.join(symbols.group)
}

struct Digits {
  min_fraction: usize,
  max_fraction: usize,
  grouping: bool,
}

/// Returns the sign and the formatted absolute value.
fn format_number(n: f64, symbols: &NumberSymbols, digits: &Digits) -> (&'static str, String) {
  let fixed = format!("{:.*}", digits.max_fraction, n.abs());
  let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
  let mut fraction = fraction.trim_end_matches('0').to_string();
  while fraction.len() < digits.min_fraction {
    fraction.push('0');
  }

  let sign = if n < 0.0 && (integer.bytes().any(|b| b != b'0') || !fraction.is_empty()) {
    "-"
  } else {
    ""
  };
  let mut formatted = if digits.grouping {
    group_digits(integer, symbols)
  } else {
    integer.to_string()
  };
  if !fraction.is_empty() {
    formatted.push_str(symbols.decimal);
    formatted.push_str(&fraction);
  }
  (sign, formatted)
}

fn fraction_digits(options: &Value, key: &str) -> Result<Option<usize>, EvalError> {
  match options.get(key) {
    None | Some(Value::Null) => Ok(None),
    Some(value) => match value.as_u64() {
      Some(digits) if digits <= 20 => Ok(Some(digits as usize)),
      _ => Err(EvalError::new(format!("{key} value is out of range."))),
    },
  }
}

enum Style {
  Decimal,
  Percent,
  Currency { symbol: String, digits: usize },
}

fn style(options: &Value) -> Result<Style, EvalError> {
  if let Some(map) = options.as_object()
    && let Some(key) = map.keys().find(|key| !SUPPORTED_OPTIONS.contains(&key.as_str()))
  {
    return Err(EvalError::new(format!(
      "_intl.numberFormat does not support option \"{key}\"."
    )));
  }
  match options.get("style").and_then(Value::as_str) {
    None | Some("decimal") => Ok(Style::Decimal),
    Some("percent") => Ok(Style::Percent),
    Some("currency") => {
      let code = options
        .get("currency")
        .and_then(Value::as_str)
        .ok_or_else(|| EvalError::new("Currency code is required with currency style."))?;
      let (symbol, digits) = currency(code);
      Ok(Style::Currency { symbol, digits })
    }
    Some(other) => Err(EvalError::new(format!(
      "_intl.numberFormat does not support style \"{other}\"."
    ))),
  }
}

/// `_intl.numberFormat`: `{ on, locale, options }` or `[on, locale, options]`.
///
/// Supports the `decimal`, `percent` and `currency` styles. Other
/// `Intl.NumberFormat` options are rejected rather than ignored.
pub(super) fn intl(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  method(call, &["numberFormat"])?;
  let (on, locale, options) = match params {
    Value::Object(map) => (map.get("on"), map.get("locale"), map.get("options")),
    Value::Array(items) => (items.first(), items.get(1), items.get(2)),
    other => (Some(other), None, None),
  };

  let n = match on {
    None | Some(Value::Null) => return Ok(Value::Null),
    Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
    Some(_) => return Err(EvalError::new("_intl.numberFormat takes a number.")),
  };
  let symbols = symbols(locale.and_then(Value::as_str).unwrap_or("en"));

  let options = options.cloned().unwrap_or(Value::Null);
  let style = style(&options)?;
  let (default_min, default_max) = match &style {
    Style::Decimal => (0, 3),
    Style::Percent => (0, 0),
    Style::Currency { digits, .. } => (*digits, *digits),
  };
  let min_fraction = fraction_digits(&options, "minimumFractionDigits")?.unwrap_or(default_min);
  let max_fraction = fraction_digits(&options, "maximumFractionDigits")?
    .unwrap_or(default_max)
    .max(min_fraction);
  let digits = Digits {
    min_fraction,
    max_fraction,
    grouping: options.get("useGrouping").and_then(Value::as_bool).unwrap_or(true),
  };

  let formatted = match style {
    Style::Decimal => {
      let (sign, number) = format_number(n, &symbols, &digits);
      format!("{sign}{number}")
    }
    Style::Percent => {
      let (sign, number) = format_number(n * 100.0, &symbols, &digits);
      format!("{sign}{number}{}%", symbols.percent_space)
    }
    Style::Currency { symbol, .. } => {
      let (sign, number) = format_number(n, &symbols, &digits);
      let space = if symbol.chars().count() > 1 && !symbols.currency_suffix {
        "\u{a0}"
      } else {
        symbols.currency_space
      };
      if symbols.currency_suffix {
        format!("{sign}{number}{space}{symbol}")
      } else {
        format!("{sign}{symbol}{space}{number}")
      }
    }
  };
  Ok(Value::String(formatted))
}
