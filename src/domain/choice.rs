//! Categorical form selections and their numeric codes.
//!
//! Each enumeration is closed: every variant has exactly one code and one
//! label, and `from_code(code())` returns the same variant.

use serde::{Deserialize, Serialize};

/// A closed set of labelled options with a fixed numeric encoding.
pub trait Choice: Copy + Eq + Sized + 'static {
    /// All variants in display order. The first one is the form default.
    const ALL: &'static [Self];

    /// Numeric code consumed by the classifier.
    fn code(self) -> u8;

    /// Human-readable label shown in the form and the echo table.
    fn label(self) -> &'static str;

    /// Look up a variant by its numeric code.
    fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Look up a variant by its exact label.
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Next option, wrapping around.
    #[must_use]
    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous option, wrapping around.
    #[must_use]
    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        if idx == 0 {
            Self::ALL[Self::ALL.len() - 1]
        } else {
            Self::ALL[idx - 1]
        }
    }
}

macro_rules! choice {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($code:expr, $label:expr) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$( Self::$variant ),+];

            fn code(self) -> u8 {
                match self {
                    $( Self::$variant => $code ),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice! {
    /// Biological sex.
    Sex {
        Female => (0, "Female"),
        Male => (1, "Male"),
    }
}

choice! {
    /// Chest pain type (`cp`).
    ChestPain {
        TypicalAngina => (0, "Typical Angina"),
        AtypicalAngina => (1, "Atypical Angina"),
        NonAnginalPain => (2, "Non-anginal Pain"),
        Asymptomatic => (3, "Asymptomatic (No Pain)"),
    }
}

choice! {
    /// Binary flag used for fasting blood sugar > 120 mg/dl (`fbs`) and
    /// exercise induced angina (`exang`).
    YesNo {
        No => (0, "No"),
        Yes => (1, "Yes"),
    }
}

choice! {
    /// Resting electrocardiogram result (`restecg`).
    RestingEcg {
        Normal => (0, "Normal"),
        StTAbnormality => (1, "ST-T Abnormality"),
        LeftVentricularHypertrophy => (2, "Left Ventricular Hypertrophy"),
    }
}

choice! {
    /// Slope of the peak exercise ST segment (`slope`).
    StSlope {
        Upsloping => (0, "Upsloping"),
        Flat => (1, "Flat"),
        Downsloping => (2, "Downsloping"),
    }
}

choice! {
    /// Number of major vessels colored by fluoroscopy (`ca`).
    MajorVessels {
        None => (0, "None"),
        One => (1, "One"),
        Two => (2, "Two"),
        Three => (3, "Three"),
    }
}

choice! {
    /// Thalassemia type (`thal`). Codes start at 1.
    Thalassemia {
        Normal => (1, "Normal"),
        FixedDefect => (2, "Fixed Defect"),
        ReversibleDefect => (3, "Reversible Defect"),
    }
}
