// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! JSON payload encoding and decoding

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::reference::Locator;

/// Decode a response body, naming what was expected on failure
pub(crate) fn decode<T: DeserializeOwned>(
    payload: &[u8],
    locator: &Locator,
    what: &'static str,
) -> Result<T> {
    serde_json::from_slice(payload).map_err(|e| Error::MalformedResponse {
        what,
        locator: locator.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcd_api::Task;

    #[test]
    fn test_decode_failure_names_payload() {
        let locator = Locator::parse("https://vcd.example.com/api/task/1").unwrap();
        let err = decode::<Task>(br#"{"status":"running"}"#, &locator, "task").unwrap_err();
        match err {
            Error::MalformedResponse { what, locator, .. } => {
                assert_eq!(what, "task");
                assert_eq!(locator, "https://vcd.example.com/api/task/1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
