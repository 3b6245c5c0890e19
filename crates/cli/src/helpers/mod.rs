// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{bail, Context, Result};

pub mod telemetry;

/// Parses `x=3,y=7` into named plaintext inputs.
pub fn parse_variables(s: &str) -> Result<Vec<(char, i64)>> {
    s.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let Some((name, value)) = pair.split_once('=') else {
                bail!("expected `name=value`, found `{pair}`");
            };
            let mut chars = name.trim().chars();
            let (Some(letter), None) = (chars.next(), chars.next()) else {
                bail!("variable names are single letters, found `{name}`");
            };
            if !letter.is_ascii_alphabetic() {
                bail!("variable names are single letters, found `{name}`");
            }
            let value = value
                .trim()
                .parse()
                .with_context(|| format!("`{value}` is not an integer"))?;
            Ok((letter, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variables() -> Result<()> {
        assert_eq!(parse_variables("x=3,y=7")?, vec![('x', 3), ('y', 7)]);
        assert_eq!(parse_variables(" a = -2 , ")?, vec![('a', -2)]);
        assert!(parse_variables("")?.is_empty());
        assert!(parse_variables("x3").is_err());
        assert!(parse_variables("xy=3").is_err());
        assert!(parse_variables("1=3").is_err());
        assert!(parse_variables("x=three").is_err());
        Ok(())
    }
}
