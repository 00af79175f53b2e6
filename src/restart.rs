// Copyright 2025 The eten developers
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Binary restart codec for the coefficient table.
//!
//! The format is positional, versionless, little-endian and fixed-width:
//! a global-settings header (`cut_global: f64`, `offset_flag: i32`,
//! `mixing: i32`, `tail_flag: i32`) followed by one record per type pair
//! i ≤ j in row-major sweep order (`set: i32`, then `a, b, c, cut` as `f64`
//! only when set). Derived constants are never persisted; a loaded table
//! must be re-finalized before evaluation. Any short read is fatal.
//!
//! Restart I/O runs at checkpoint boundaries under exclusive access; no
//! force evaluation is in flight while a table is being written or read.

use crate::error::EtenError;
use crate::table::EtenTable;
use crate::DistanceMixing;
use itertools::iproduct;
use std::io::{self, Read, Write};

fn write_f64<W: Write>(writer: &mut W, value: f64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn read_f64<R: Read>(reader: &mut R) -> io::Result<f64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_flag<R: Read>(reader: &mut R, what: &str) -> Result<bool, EtenError> {
    match read_i32(reader)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(EtenError::Restart(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid {what} flag {other} in restart stream"),
        ))),
    }
}

impl DistanceMixing {
    fn to_restart(self) -> i32 {
        match self {
            Self::Arithmetic => 0,
            Self::Geometric => 1,
        }
    }

    fn from_restart(value: i32) -> Result<Self, EtenError> {
        match value {
            0 => Ok(Self::Arithmetic),
            1 => Ok(Self::Geometric),
            other => Err(EtenError::Restart(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid mixing rule {other} in restart stream"),
            ))),
        }
    }
}

impl EtenTable {
    /// Write global settings and all pair records to a restart sink.
    pub fn write_restart<W: Write>(&self, writer: &mut W) -> Result<(), EtenError> {
        write_f64(writer, self.cut_global)?;
        write_i32(writer, self.offset_flag as i32)?;
        write_i32(writer, self.mixing.to_restart())?;
        write_i32(writer, self.tail_flag as i32)?;

        for (i, j) in iproduct!(1..=self.ntypes(), 1..=self.ntypes()).filter(|(i, j)| i <= j) {
            if self.is_allocated() && self.entry(i, j).set {
                let entry = self.entry(i, j);
                write_i32(writer, 1)?;
                write_f64(writer, entry.a)?;
                write_f64(writer, entry.b)?;
                write_f64(writer, entry.c)?;
                write_f64(writer, entry.cut)?;
            } else {
                write_i32(writer, 0)?;
            }
        }
        Ok(())
    }

    /// Read a table back from a restart source.
    ///
    /// Reproduces the exact setup-time state: settings, set flags and the
    /// fundamental coefficients. Derived constants are recomputed by the
    /// caller's re-finalization, not read. A truncated or malformed stream
    /// fails the whole load; no partial table is returned.
    pub fn read_restart<R: Read>(ntypes: usize, reader: &mut R) -> Result<Self, EtenError> {
        let cut_global = read_f64(reader)?;
        if !(cut_global > 0.0) {
            return Err(EtenError::Restart(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid global cutoff {cut_global} in restart stream"),
            )));
        }
        let offset_flag = read_flag(reader, "offset")?;
        let mixing = DistanceMixing::from_restart(read_i32(reader)?)?;
        let tail_flag = read_flag(reader, "tail")?;

        let mut table = Self::new(ntypes, cut_global);
        table.offset_flag = offset_flag;
        table.mixing = mixing;
        table.tail_flag = tail_flag;
        table.allocate();

        for (i, j) in iproduct!(1..=ntypes, 1..=ntypes).filter(|(i, j)| i <= j) {
            if read_flag(reader, "pair set")? {
                let a = read_f64(reader)?;
                let b = read_f64(reader)?;
                let c = read_f64(reader)?;
                let cut = read_f64(reader)?;
                let idx = table.idx(i, j);
                let entry = &mut table.coeffs[idx];
                entry.a = a;
                entry.b = b;
                entry.c = c;
                entry.cut = cut;
                entry.set = true;
            }
        }
        Ok(table)
    }

    /// Text dump of all pair coefficients, one `i j a b c cut` line per
    /// pair i ≤ j.
    pub fn write_coeffs<W: Write>(&self, writer: &mut W) -> Result<(), EtenError> {
        for (i, j) in iproduct!(1..=self.ntypes(), 1..=self.ntypes()).filter(|(i, j)| i <= j) {
            let entry = self.entry(i, j);
            writeln!(
                writer,
                "{} {} {} {} {} {}",
                i, j, entry.a, entry.b, entry.c, entry.cut
            )?;
        }
        Ok(())
    }

    /// Text dump of the homogeneous (i, i) coefficients, one `i a b c`
    /// line per type.
    pub fn write_coeffs_diagonal<W: Write>(&self, writer: &mut W) -> Result<(), EtenError> {
        for i in 1..=self.ntypes() {
            let entry = self.entry(i, i);
            writeln!(writer, "{} {} {} {}", i, entry.a, entry.b, entry.c)?;
        }
        Ok(())
    }
}
