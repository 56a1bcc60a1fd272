// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/fetcher.rs - Downloads the esptool stub flasher source.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::time::Duration;

use tracing::{debug, info};

use crate::error::FetchError;

const TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads `url` and returns the response body as text.
///
/// Any transport failure or non-success status is an error. There are no
/// retries.
pub fn fetch_source(url: &str) -> Result<String, FetchError> {
    info!("Downloading {}", url);

    let transport = |source| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(transport)?;

    let response = client.get(url).send().map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.bytes().map_err(transport)?;
    debug!("Received {} bytes", body.len());

    String::from_utf8(body.to_vec()).map_err(|source| FetchError::NotUtf8 {
        url: url.to_string(),
        source,
    })
}
