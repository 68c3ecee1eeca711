// Copyright 2025 Google LLC
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

//! The ephemeral commissioning password (ePSKc).

use zeroize::Zeroizing;

/// The admin code the border router displays to the end user.
///
/// A short decimal secret of 6 to 12 ASCII digits, matching
/// `^[0-9]{6,12}$` after surrounding ASCII whitespace is trimmed. The
/// validated digits become the EC-JPAKE shared secret for the DTLS
/// handshake, as raw ASCII bytes (no hex expansion, no key derivation).
///
/// The backing storage is zeroized on drop, and both `Debug` and
/// `Display` redact the value. The code is never logged and never
/// persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCode(Zeroizing<String>);

impl AdminCode {
    /// Validate and wrap an admin code.
    ///
    /// Trims surrounding ASCII whitespace first; the remainder must be
    /// 6 to 12 ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAdminCode`] if the trimmed input does not match.
    pub fn new(raw: &str) -> Result<Self, InvalidAdminCode> {
        let trimmed = raw.trim_matches(|c: char| c.is_ascii_whitespace());
        if (6..=12).contains(&trimmed.len()) && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(Zeroizing::new(trimmed.to_string())))
        } else {
            Err(InvalidAdminCode)
        }
    }

    /// The ASCII digit bytes, as installed into the handshake.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::str::FromStr for AdminCode {
    type Err = InvalidAdminCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Debug for AdminCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminCode(..)")
    }
}

/// The admin code failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("admin code must be 6-12 decimal digits")]
pub struct InvalidAdminCode;
