// Copyright 2024 The jsonapi-assert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;

use jsonapi_assert::{AssertionError, CompareMode, ComparisonPolicy, HttpMessage, MEDIA_TYPE};

#[doc(hidden)]
#[macro_export]
macro_rules! handle_error {
    ($code:expr, $msg:expr, $($arg:tt)*) => {
        println!($msg, $($arg)*);
        std::process::exit($code);
    };

    ($code:expr, $msg:expr) => {
        println!($msg);
        std::process::exit($code);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! check {
    ($name:expr, $result:expr) => {
        match $result {
            Ok(()) => println!("{} ✅", $name),
            Err(AssertionError::Invalid(err)) => {
                println!("{} ❌", $name);
                handle_error!(Code::INVALID_DOCUMENT, "-------------\n{}", err);
            }
            Err(AssertionError::Failed(failure)) => {
                println!("{} ❌", $name);
                handle_error!(Code::ASSERTION_ERROR, "-------------\n{}", failure);
            }
        }
    };
}

#[doc(hidden)]
struct Code;

impl Code {
    const SUCCESS: i32 = 0;
    const INTERNAL_ERROR: i32 = 1;
    const INVALID_ARGUMENT: i32 = 2;
    const INVALID_DOCUMENT: i32 = 3;
    const ASSERTION_ERROR: i32 = 4;
}

#[doc(hidden)]
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File with the JSON expected in the response
    expected: PathBuf,

    /// URL to fetch
    #[clap(short, long, required = true)]
    url: String,

    /// Expected status code
    #[clap(short, long, default_value_t = 200)]
    status: u16,

    /// Expected media type
    #[clap(short, long, default_value = MEDIA_TYPE)]
    media_type: String,

    /// JSON pointer to the member compared with the expected JSON
    #[clap(short, long, default_value = "/data")]
    pointer: String,

    /// Allow members of objects that are not expected
    #[clap(long)]
    loose: bool,

    /// Lists must match in the expected order
    #[clap(long)]
    in_order: bool,

    /// Lists must only contain the expected values
    #[clap(long)]
    only: bool,
}

impl Cli {
    fn policy(&self) -> ComparisonPolicy {
        let mode = if self.loose {
            CompareMode::Loose
        } else {
            CompareMode::Strict
        };

        ComparisonPolicy::new(mode)
            .ordered(self.in_order)
            .exhaustive(self.only)
    }
}

#[doc(hidden)]
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let expected = match std::fs::read_to_string(&cli.expected) {
        Ok(raw) => raw,
        Err(err) => {
            handle_error!(
                Code::INVALID_ARGUMENT,
                "Error reading {}: {}",
                cli.expected.display(),
                err
            );
        }
    };
    let expected: Value = match serde_json::from_str(&expected) {
        Ok(value) => value,
        Err(err) => {
            handle_error!(
                Code::INVALID_ARGUMENT,
                "Error parsing {}: {}",
                cli.expected.display(),
                err
            );
        }
    };

    let response = match reqwest::get(cli.url.as_str()).await {
        Ok(response) => response,
        Err(err) => {
            handle_error!(Code::INTERNAL_ERROR, "Error fetching {}: {}", cli.url, err);
        }
    };
    let http = match HttpMessage::from_response(response).await {
        Ok(http) => http,
        Err(err) => {
            handle_error!(Code::INTERNAL_ERROR, "Error reading response: {}", err);
        }
    };

    check!(
        format!("status {}", cli.status),
        http.assert_status(cli.status)
    );
    check!(
        format!("media type {}", cli.media_type),
        http.assert_media_type(&cli.media_type)
    );
    check!(
        format!("{} at [{}]", cli.expected.display(), cli.pointer),
        http.assert_subset(cli.pointer.as_str(), expected, &cli.policy())
    );

    std::process::exit(Code::SUCCESS);
}
