// src/strength.rs

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthLevel {
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strength {
    pub points: u8,
    pub level: StrengthLevel,
}

impl Strength {
    pub fn label(&self) -> &'static str {
        match self.level {
            StrengthLevel::Weak => "Weak Password",
            StrengthLevel::Medium => "Medium Password",
            StrengthLevel::Strong => "Strong Password",
        }
    }
}

const MIN_LENGTH: usize = 8;

/// Scores a password with four one-point checks: length of at least eight
/// characters, an ASCII uppercase letter, an ASCII digit, and anything outside
/// `[A-Za-z0-9]`. Length is counted independently of the other checks.
pub fn score(password: &str) -> Strength {
    let checks = [
        password.chars().count() >= MIN_LENGTH,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let points = checks.iter().filter(|passed| **passed).count() as u8;

    let level = match points {
        0 | 1 => StrengthLevel::Weak,
        2 => StrengthLevel::Medium,
        _ => StrengthLevel::Strong,
    };
    Strength { points, level }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_table() {
        let cases = [
            ("short", 0, StrengthLevel::Weak),
            ("password", 1, StrengthLevel::Weak),
            ("alllowercase", 1, StrengthLevel::Weak),
            ("Password1", 3, StrengthLevel::Strong),
            ("Pw1!", 3, StrengthLevel::Strong),
            ("Password", 2, StrengthLevel::Medium),
            ("Pass word1!", 4, StrengthLevel::Strong),
            ("", 0, StrengthLevel::Weak),
        ];
        for (password, points, level) in cases {
            let strength = score(password);
            assert_eq!(strength.points, points, "points for {:?}", password);
            assert_eq!(strength.level, level, "level for {:?}", password);
        }
    }

    #[test]
    fn test_non_ascii_letters_count_as_special() {
        // 'É' is neither A-Z nor 0-9, so it earns the special point, not the uppercase one.
        let strength = score("É");
        assert_eq!(strength.points, 1);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert_eq!(score("ééééééé").points, 1);
        assert_eq!(score("éééééééé").points, 2);
    }

    #[test]
    fn test_labels() {
        assert_eq!(score("abc").label(), "Weak Password");
        assert_eq!(score("abcdefgH").label(), "Medium Password");
        assert_eq!(score("abcdefgH1").label(), "Strong Password");
    }
}
