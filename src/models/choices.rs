// Fixed code <-> label tables for every enumerated column.
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChoice(pub String);

impl fmt::Display for UnknownChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Select a valid choice. {} is not one of the available choices.", self.0)
    }
}

impl std::error::Error for UnknownChoice {}

macro_rules! choices {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($code:literal, $label:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok($name::$variant),)+
                    other => Err(UnknownChoice(other.to_string())),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownChoice;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.code().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.code()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: UnknownChoice| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

choices!(
    /// Product catalog categories.
    Category {
        Foundation => ("foundation", "Foundation"),
        Lipstick => ("lipstick", "Lipstick"),
        Mascara => ("mascara", "Mascara"),
        Eyeshadow => ("eyeshadow", "Eyeshadow"),
        Concealer => ("concealer", "Concealer"),
        Blush => ("blush", "Blush"),
        Highlighter => ("highlighter", "Highlighter"),
        Skincare => ("skincare", "Skincare"),
        Powder => ("powder", "Powder"),
    }
);

choices!(
    MediaKind {
        Photo => ("photo", "Photo"),
        Video => ("video", "Video"),
    }
);

choices!(
    SkinType {
        Oily => ("oily", "Oily"),
        Dry => ("dry", "Dry"),
        Combination => ("combination", "Combination"),
        Sensitive => ("sensitive", "Sensitive"),
        Normal => ("normal", "Normal"),
    }
);

choices!(
    SkinTone {
        Fair => ("fair", "Fair"),
        Light => ("light", "Light"),
        Medium => ("medium", "Medium"),
        Tan => ("tan", "Tan"),
        Deep => ("deep", "Deep"),
    }
);

choices!(
    AgeRange {
        From18To24 => ("18-24", "18-24"),
        From25To34 => ("25-34", "25-34"),
        From35To44 => ("35-44", "35-44"),
        From45To54 => ("45-54", "45-54"),
        Over55 => ("55+", "55+"),
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_table_has_nine_entries() {
        assert_eq!(Category::ALL.len(), 9);
        assert_eq!("highlighter".parse::<Category>(), Ok(Category::Highlighter));
        assert_eq!(Category::Skincare.label(), "Skincare");
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!("Lipstick".parse::<Category>().is_err());
        assert!("selfie".parse::<MediaKind>().is_err());
        assert_eq!("55+".parse::<AgeRange>(), Ok(AgeRange::Over55));
    }
}
