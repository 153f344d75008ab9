// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Object-to-text conversion with a non-failing fallback chain.

use std::fmt;
use std::fmt::Write as _;

use serde::Serialize;

/// Converts a value to its textual log form.
///
/// The conversion tries three representations in order: the JSON form, the
/// `Debug` form, and finally a fixed diagnostic naming the value's type.
/// It never fails.
///
/// `None` and `()` yield the text `null`. Strings passed here gain JSON
/// quoting; the string entry points on [`FileLogger`](crate::FileLogger)
/// store them verbatim instead.
///
/// # Examples
///
/// ```
/// assert_eq!(rotolog::to_text(&vec![1, 2, 3]), "[1,2,3]");
/// assert_eq!(rotolog::to_text(&None::<i32>), "null");
/// ```
pub fn to_text<T>(value: &T) -> String
where
    T: Serialize + fmt::Debug + ?Sized,
{
    if let Ok(text) = serde_json::to_string(value) {
        return text;
    }

    let mut text = String::new();
    if write!(text, "{value:?}").is_ok() {
        return text;
    }

    format!(
        "<value of type {} could not be serialized>",
        std::any::type_name::<T>()
    )
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use serde::Serialize;
    use serde::Serializer;
    use serde::ser::Error as _;

    use super::to_text;

    #[derive(Debug)]
    struct RefusesJson;

    impl Serialize for RefusesJson {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("not representable"))
        }
    }

    struct RefusesEverything;

    impl Serialize for RefusesEverything {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("not representable"))
        }
    }

    impl fmt::Debug for RefusesEverything {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[derive(Debug, Serialize)]
    struct Payment {
        amount: u32,
        currency: &'static str,
    }

    #[test]
    fn test_json_form() {
        let payment = Payment {
            amount: 450,
            currency: "EUR",
        };
        assert_eq!(to_text(&payment), r#"{"amount":450,"currency":"EUR"}"#);
    }

    #[test]
    fn test_null_form() {
        assert_eq!(to_text(&None::<u32>), "null");
        assert_eq!(to_text(&()), "null");
    }

    #[test]
    fn test_debug_fallback() {
        assert_eq!(to_text(&RefusesJson), "RefusesJson");
    }

    #[test]
    fn test_last_resort_diagnostic() {
        let text = to_text(&RefusesEverything);
        assert!(text.starts_with("<value of type "));
        assert!(text.contains("RefusesEverything"));
    }
}
