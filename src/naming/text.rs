// Copyright 2025 dentsusoken
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

/// Canonical program id for a display name: spaces become `.` and the
/// result is lowercase.
pub fn to_luid(name: &str) -> String {
    name.replace(' ', ".").to_lowercase()
}

/// Uppercase every letter that follows a non-letter and lowercase the rest,
/// so `bash2py` becomes `Bash2Py` and `brscan skey` becomes `Brscan Skey`.
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(c);
            previous_is_letter = false;
        }
    }
    result
}

pub fn is_all_lowercase(value: &str) -> bool {
    value.to_lowercase() == value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luid_is_deterministic_and_lowercase() {
        assert_eq!(to_luid("Ultimaker Cura"), "ultimaker.cura");
        assert_eq!(to_luid("Ninja-IDE"), "ninja-ide");
        assert_eq!(to_luid("Ultimaker Cura"), to_luid("Ultimaker Cura"));
    }

    #[test]
    fn title_case_follows_letter_boundaries() {
        assert_eq!(title_case("bash2py"), "Bash2Py");
        assert_eq!(title_case("mfcl2740dwlpr"), "Mfcl2740Dwlpr");
        assert_eq!(title_case("monero gui"), "Monero Gui");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn lowercase_check_ignores_non_letters() {
        assert!(is_all_lowercase("bash2py"));
        assert!(is_all_lowercase("123"));
        assert!(!is_all_lowercase("FreeCAD"));
    }
}
