//! Outer-totalistic rule strings.
//!
//! Accepted forms (case-insensitive):
//!
//! | Form | Example |
//! |------|---------|
//! | B/S | `B3/S23`, `b3s23` |
//! | B/S with state count | `B2/S/C3`, `B2/S/G3`, `B2/S/3` |
//! | S/B legacy | `23/3` |
//! | S/B/C legacy | `345/2/4` |

use crate::error::EngineError;

/// Birth/survival conditions plus the number of states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    birth: [bool; 9],
    survival: [bool; 9],
    states: u16,
}

impl Rule {
    /// Parse a rule string.
    pub fn parse(input: &str) -> Result<Rule, EngineError> {
        let invalid = || EngineError::InvalidRule(input.trim().to_string());
        let text = input.trim().to_ascii_lowercase();
        if text.is_empty() {
            return Err(invalid());
        }

        let mut birth: Option<[bool; 9]> = None;
        let mut survival: Option<[bool; 9]> = None;
        let mut states: Option<u16> = None;

        let tokens: Vec<&str> = if text.contains('/') {
            text.split('/').collect()
        } else if let Some(idx) = text.find('s').filter(|_| text.starts_with('b')) {
            vec![&text[..idx], &text[idx..]]
        } else {
            vec![text.as_str()]
        };

        let lettered = tokens
            .iter()
            .any(|t| t.starts_with('b') || t.starts_with('s'));

        if lettered {
            for token in &tokens {
                match token.chars().next() {
                    Some('b') => birth = Some(digits(&token[1..]).ok_or_else(invalid)?),
                    Some('s') => survival = Some(digits(&token[1..]).ok_or_else(invalid)?),
                    Some('c') | Some('g') => {
                        states = Some(token[1..].parse().map_err(|_| invalid())?)
                    }
                    Some(c) if c.is_ascii_digit() => {
                        states = Some(token.parse().map_err(|_| invalid())?)
                    }
                    _ => return Err(invalid()),
                }
            }
        } else {
            // S/B or S/B/C
            match tokens.as_slice() {
                [s, b] => {
                    survival = Some(digits(s).ok_or_else(invalid)?);
                    birth = Some(digits(b).ok_or_else(invalid)?);
                }
                [s, b, c] => {
                    survival = Some(digits(s).ok_or_else(invalid)?);
                    birth = Some(digits(b).ok_or_else(invalid)?);
                    states = Some(c.parse().map_err(|_| invalid())?);
                }
                _ => return Err(invalid()),
            }
        }

        let birth = birth.ok_or_else(invalid)?;
        let survival = survival.unwrap_or([false; 9]);
        let states = states.unwrap_or(2);
        if !(2..=256).contains(&states) {
            return Err(invalid());
        }
        if birth[0] {
            return Err(EngineError::UnsupportedRule(format!(
                "{} (B0 rules are not supported)",
                input.trim()
            )));
        }

        Ok(Rule {
            birth,
            survival,
            states,
        })
    }

    pub fn states(&self) -> u16 {
        self.states
    }

    pub fn is_born(&self, neighbours: u8) -> bool {
        self.birth[neighbours as usize]
    }

    pub fn survives(&self, neighbours: u8) -> bool {
        self.survival[neighbours as usize]
    }

    /// Canonical `B../S..` form, with `/C<n>` for multi-state rules.
    pub fn canonical(&self) -> String {
        let mut out = String::from("B");
        push_digits(&mut out, &self.birth);
        out.push_str("/S");
        push_digits(&mut out, &self.survival);
        if self.states > 2 {
            out.push_str(&format!("/C{}", self.states));
        }
        out
    }
}

fn digits(s: &str) -> Option<[bool; 9]> {
    let mut set = [false; 9];
    for c in s.chars() {
        let d = c.to_digit(10)? as usize;
        if d > 8 {
            return None;
        }
        set[d] = true;
    }
    Some(set)
}

fn push_digits(out: &mut String, set: &[bool; 9]) {
    for (d, on) in set.iter().enumerate() {
        if *on {
            out.push(char::from(b'0' + d as u8));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_life() {
        let r = Rule::parse("B3/S23").unwrap();
        assert!(r.is_born(3));
        assert!(r.survives(2) && r.survives(3));
        assert!(!r.survives(4));
        assert_eq!(r.states(), 2);
        assert_eq!(r.canonical(), "B3/S23");
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(Rule::parse("b3s23").unwrap().canonical(), "B3/S23");
        assert_eq!(Rule::parse("23/3").unwrap().canonical(), "B3/S23");
        assert_eq!(Rule::parse("B36/S23").unwrap().canonical(), "B36/S23");
        assert_eq!(Rule::parse("345/2/4").unwrap().canonical(), "B2/S345/C4");
    }

    #[test]
    fn test_parse_generations() {
        let r = Rule::parse("B2/S/C3").unwrap();
        assert_eq!(r.states(), 3);
        assert_eq!(r.canonical(), "B2/S/C3");
        assert_eq!(Rule::parse("B2/S/G3").unwrap(), r);
        assert_eq!(Rule::parse("B2/S/3").unwrap(), r);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Rule::parse("B9/S23"),
            Err(EngineError::InvalidRule(_))
        ));
        assert!(Rule::parse("").is_err());
        assert!(Rule::parse("hello").is_err());
        assert!(Rule::parse("B3/S23/C1").is_err());
        assert!(matches!(
            Rule::parse("B03/S23"),
            Err(EngineError::UnsupportedRule(_))
        ));
    }
}
