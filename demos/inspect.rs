// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  inspect.rs - Prints the layout of a generated stub file.
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

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use espstubgen::serializer::read_stub;
use espstubgen::stub::StubValue;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The stub JSON file to read.
    file: String,
}

fn show_address(label: &str, address: Option<u64>) {
    match address {
        Some(a) => println!("{}: 0x{:08x}", label, a),
        None => println!("{}: (none)", label),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let stub = match read_stub(Path::new(&args.file)) {
        Ok(stub) => stub,
        Err(error) => {
            eprintln!("Error reading stub {:?}: {}", &args.file, error);
            return ExitCode::FAILURE;
        }
    };

    show_address("Entry", stub.entry());
    show_address("Text start", stub.text_start());
    println!("Text size: {} bytes", stub.text().len());
    show_address("Data start", stub.data_start());
    println!("Data size: {} bytes", stub.data().len());

    for (name, value) in stub.fields() {
        if let StubValue::Scalar(v) = value {
            if !matches!(name, "entry" | "text_start" | "data_start") {
                println!("{}: {}", name, v);
            }
        }
    }

    ExitCode::SUCCESS
}
