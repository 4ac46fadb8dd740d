use std::fmt::{Display, Formatter};
use std::io::{Read, Write};

use log::info;

use crate::arithmetic_coding::arithmetic::{self, ac_encode};
use crate::bwt_algorithms::bwt::{self, bwt_decode, bwt_encode, BwtRecord};
use crate::dictionary::lz77::{self, lz77_decode, lz77_encode, Lz77Record};
use crate::error::{CodecError, Result};
use crate::huffman_coding::huffman::{self, huffman_encode};
use crate::tools::mtf::{self, mtf_decode, mtf_encode, MtfRecord};
use crate::tools::rle::{self, rle_decode, rle_encode, RleRecord};
use crate::tools::settings::Settings;
use crate::tools::symbol::Symbol;
use crate::tools::wire::{read_u32, write_u32};

/// Every single codec and every named pipeline. The discriminant is the id stored in file
/// headers, so existing values must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Method {
    Bwt = 0,
    Mtf = 1,
    Rle = 2,
    Lz77 = 3,
    Huffman = 4,
    Arithmetic = 5,
    BwtMtfAc = 6,
    BwtMtfRleAc = 7,
    BwtMtfRleHa = 8,
    BwtRle = 9,
    Lz77Ha = 10,
    RleHa = 11,
}

/// A codec as it appears in a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Bwt,
    Mtf,
    Rle,
    Lz77,
    Ha,
    Ac,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Bwt => "BWT",
            Stage::Mtf => "MTF",
            Stage::Rle => "RLE",
            Stage::Lz77 => "LZ77",
            Stage::Ha => "HA",
            Stage::Ac => "AC",
        };
        write!(f, "{}", name)
    }
}

impl Method {
    pub const ALL: [Method; 12] = [
        Method::Bwt,
        Method::Mtf,
        Method::Rle,
        Method::Lz77,
        Method::Huffman,
        Method::Arithmetic,
        Method::BwtMtfAc,
        Method::BwtMtfRleAc,
        Method::BwtMtfRleHa,
        Method::BwtRle,
        Method::Lz77Ha,
        Method::RleHa,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Result<Self> {
        Method::ALL
            .get(id as usize)
            .copied()
            .ok_or_else(|| CodecError::corrupted(format!("unknown method id {}", id)))
    }

    /// Stages in encode order.
    pub fn stages(self) -> &'static [Stage] {
        match self {
            Method::Bwt => &[Stage::Bwt],
            Method::Mtf => &[Stage::Mtf],
            Method::Rle => &[Stage::Rle],
            Method::Lz77 => &[Stage::Lz77],
            Method::Huffman => &[Stage::Ha],
            Method::Arithmetic => &[Stage::Ac],
            Method::BwtMtfAc => &[Stage::Bwt, Stage::Mtf, Stage::Ac],
            Method::BwtMtfRleAc => &[Stage::Bwt, Stage::Mtf, Stage::Rle, Stage::Ac],
            Method::BwtMtfRleHa => &[Stage::Bwt, Stage::Mtf, Stage::Rle, Stage::Ha],
            Method::BwtRle => &[Stage::Bwt, Stage::Rle],
            Method::Lz77Ha => &[Stage::Lz77, Stage::Ha],
            Method::RleHa => &[Stage::Rle, Stage::Ha],
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.stages().iter().map(|s| s.to_string()).collect();
        write!(f, "{}", names.join("-"))
    }
}

/// Encode `data` with `method`, writing its stream to `w`.
pub fn encode<S: Symbol, W: Write>(
    method: Method,
    data: &[S],
    w: &mut W,
    utf8: bool,
    settings: &Settings,
) -> Result<()> {
    settings.validate()?;
    info!("Encoding {} symbols with {}", data.len(), method);
    match method {
        Method::Bwt => bwt::encode(data, w, utf8),
        Method::Mtf => mtf::encode(data, w, utf8),
        Method::Rle => rle::encode(data, w, utf8),
        Method::Lz77 => lz77::encode(data, w, utf8, settings),
        Method::Huffman => huffman::encode(data, w, utf8, settings),
        Method::Arithmetic => arithmetic::encode(data, w, utf8),
        Method::BwtMtfAc => encode_bwt_mtf_ac(data, w, utf8),
        Method::BwtMtfRleAc | Method::BwtMtfRleHa => {
            encode_bwt_mtf_rle(method, data, w, utf8, settings)
        }
        Method::BwtRle => encode_bwt_rle(data, w, utf8),
        Method::Lz77Ha => encode_lz77_ha(data, w, utf8, settings),
        Method::RleHa => encode_rle_ha(data, w, utf8, settings),
    }
}

/// Decode a stream written by `encode` with the same method, flag and settings.
pub fn decode<S: Symbol, R: Read>(
    method: Method,
    r: &mut R,
    utf8: bool,
    settings: &Settings,
) -> Result<Vec<S>> {
    settings.validate()?;
    info!("Decoding with {}", method);
    match method {
        Method::Bwt => bwt::decode(r, utf8),
        Method::Mtf => mtf::decode(r, utf8),
        Method::Rle => rle::decode(r, utf8),
        Method::Lz77 => lz77::decode(r, utf8),
        Method::Huffman => huffman::decode(r, utf8, settings),
        Method::Arithmetic => arithmetic::decode(r, utf8),
        Method::BwtMtfAc => decode_bwt_mtf_ac(r, utf8),
        Method::BwtMtfRleAc | Method::BwtMtfRleHa => decode_bwt_mtf_rle(method, r, utf8, settings),
        Method::BwtRle => decode_bwt_rle(r, utf8),
        Method::Lz77Ha => decode_lz77_ha(r, utf8, settings),
        Method::RleHa => decode_rle_ha(r, utf8, settings),
    }
}

/*
Every pipeline below follows the same pattern: each stage consumes the previous stage's record
and the record is dropped as soon as the next one exists, so at most two stages' buffers are
alive at once. The entropy section is written first, then the metadata the earlier stages
need (MTF alphabet, BWT key, original length), in a fixed order per pipeline.
*/

/// BWT -> MTF -> AC. Layout: AC section, MTF alphabet, BWT key.
fn encode_bwt_mtf_ac<S: Symbol, W: Write>(data: &[S], w: &mut W, utf8: bool) -> Result<()> {
    let bwt = bwt_encode(data)?;
    info!("BWT done");
    let key = bwt.key;
    let mtf = mtf_encode(&bwt.data)?;
    drop(bwt);
    info!("MTF done");

    let codes = mtf.to_symbols();
    let ac = ac_encode(&codes)?;
    drop(codes);
    info!("AC done");

    ac.write_to(w, utf8)?;
    mtf.write_alphabet(w, utf8)?;
    write_u32(w, key)
}

fn decode_bwt_mtf_ac<S: Symbol, R: Read>(r: &mut R, utf8: bool) -> Result<Vec<S>> {
    let codes: Vec<S> = arithmetic::decode(r, utf8)?;
    info!("AC done");
    let alphabet = MtfRecord::<S>::read_alphabet(r, utf8)?;
    let key = read_u32(r)?;

    let mtf = MtfRecord::from_symbols(alphabet, &codes);
    drop(codes);
    let data = mtf_decode(&mtf)?;
    drop(mtf);
    info!("MTF done");

    let out = bwt_decode(&BwtRecord { key, data })?;
    info!("BWT done");
    Ok(out)
}

/// BWT -> MTF -> RLE -> AC or HA. Layout: entropy section, MTF alphabet, BWT key.
fn encode_bwt_mtf_rle<S: Symbol, W: Write>(
    method: Method,
    data: &[S],
    w: &mut W,
    utf8: bool,
    settings: &Settings,
) -> Result<()> {
    let bwt = bwt_encode(data)?;
    info!("BWT done");
    let key = bwt.key;
    let mtf = mtf_encode(&bwt.data)?;
    drop(bwt);
    info!("MTF done");

    let codes = mtf.to_symbols();
    let rle = rle_encode(&codes)?;
    drop(codes);
    let tokens = rle.to_symbols();
    drop(rle);
    info!("RLE done");

    if method == Method::BwtMtfRleAc {
        let ac = ac_encode(&tokens)?;
        drop(tokens);
        info!("AC done");
        ac.write_to(w, utf8)?;
    } else {
        let ha = huffman_encode(&tokens, settings)?;
        drop(tokens);
        info!("HA done");
        ha.write_to(w, utf8)?;
    }
    mtf.write_alphabet(w, utf8)?;
    write_u32(w, key)
}

fn decode_bwt_mtf_rle<S: Symbol, R: Read>(
    method: Method,
    r: &mut R,
    utf8: bool,
    settings: &Settings,
) -> Result<Vec<S>> {
    let tokens: Vec<S> = if method == Method::BwtMtfRleAc {
        arithmetic::decode(r, utf8)?
    } else {
        huffman::decode(r, utf8, settings)?
    };
    info!("Entropy stage done");
    let alphabet = MtfRecord::<S>::read_alphabet(r, utf8)?;
    let key = read_u32(r)?;

    let rle = RleRecord::from_symbols(&tokens)?;
    drop(tokens);
    let codes = rle_decode(&rle)?;
    drop(rle);
    info!("RLE done");

    let mtf = MtfRecord::from_symbols(alphabet, &codes);
    drop(codes);
    let data = mtf_decode(&mtf)?;
    drop(mtf);
    info!("MTF done");

    let out = bwt_decode(&BwtRecord { key, data })?;
    info!("BWT done");
    Ok(out)
}

/// BWT -> RLE. Layout: RLE section, BWT key.
fn encode_bwt_rle<S: Symbol, W: Write>(data: &[S], w: &mut W, utf8: bool) -> Result<()> {
    let bwt = bwt_encode(data)?;
    info!("BWT done");
    let key = bwt.key;
    let rle = rle_encode(&bwt.data)?;
    drop(bwt);
    info!("RLE done");

    rle.write_to(w, utf8)?;
    write_u32(w, key)
}

fn decode_bwt_rle<S: Symbol, R: Read>(r: &mut R, utf8: bool) -> Result<Vec<S>> {
    let rle = RleRecord::<S>::read_from(r, utf8)?;
    let key = read_u32(r)?;
    let data = rle_decode(&rle)?;
    drop(rle);
    info!("RLE done");

    let out = bwt_decode(&BwtRecord { key, data })?;
    info!("BWT done");
    Ok(out)
}

/// LZ77 -> HA. Layout: HA section, original length.
fn encode_lz77_ha<S: Symbol, W: Write>(
    data: &[S],
    w: &mut W,
    utf8: bool,
    settings: &Settings,
) -> Result<()> {
    let lz77 = lz77_encode(data, settings)?;
    info!("LZ77 done");
    let length = lz77.length;
    let tokens = lz77.to_symbols()?;
    drop(lz77);

    let ha = huffman_encode(&tokens, settings)?;
    drop(tokens);
    info!("HA done");

    ha.write_to(w, utf8)?;
    write_u32(w, length)
}

fn decode_lz77_ha<S: Symbol, R: Read>(r: &mut R, utf8: bool, settings: &Settings) -> Result<Vec<S>> {
    let tokens: Vec<S> = huffman::decode(r, utf8, settings)?;
    info!("HA done");
    let length = read_u32(r)?;

    let lz77 = Lz77Record::from_symbols(&tokens, length)?;
    drop(tokens);
    let out = lz77_decode(&lz77)?;
    info!("LZ77 done");
    Ok(out)
}

/// RLE -> HA. Layout: HA section only.
fn encode_rle_ha<S: Symbol, W: Write>(
    data: &[S],
    w: &mut W,
    utf8: bool,
    settings: &Settings,
) -> Result<()> {
    let rle = rle_encode(data)?;
    info!("RLE done");
    let tokens = rle.to_symbols();
    drop(rle);

    let ha = huffman_encode(&tokens, settings)?;
    drop(tokens);
    info!("HA done");
    ha.write_to(w, utf8)
}

fn decode_rle_ha<S: Symbol, R: Read>(r: &mut R, utf8: bool, settings: &Settings) -> Result<Vec<S>> {
    let tokens: Vec<S> = huffman::decode(r, utf8, settings)?;
    info!("HA done");
    let rle = RleRecord::from_symbols(&tokens)?;
    drop(tokens);
    let out = rle_decode(&rle)?;
    info!("RLE done");
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn round_trip<S: Symbol>(method: Method, data: &[S], utf8: bool, settings: &Settings) {
        let mut out = vec![];
        encode(method, data, &mut out, utf8, settings).unwrap();
        let mut source = out.as_slice();
        let back: Vec<S> = decode(method, &mut source, utf8, settings).unwrap();
        assert_eq!(back, data, "{} utf8={}", method, utf8);
        assert!(source.is_empty(), "{} left {} bytes", method, source.len());
    }

    /// Text-like input: a small alphabet with runs and repeats.
    fn sample<S: Symbol>(rng: &mut StdRng, len: usize, base: u32, spread: u32) -> Vec<S> {
        let mut data = Vec::with_capacity(len);
        while data.len() < len {
            let sym = S::from_u32(base + rng.gen_range(0..spread));
            let run = if rng.gen_bool(0.2) { rng.gen_range(2..200) } else { 1 };
            data.extend(std::iter::repeat(sym).take(run.min(len - data.len())));
            if rng.gen_bool(0.1) && data.len() > 10 {
                let from = rng.gen_range(0..data.len() - 5);
                let copy: Vec<S> = data[from..from + 5].to_vec();
                data.extend(copy.into_iter().take(len - data.len()));
            }
        }
        data
    }

    #[test]
    fn banana_through_bwt_mtf_ac() {
        let data = "banana".as_bytes();
        let mut out = vec![];
        encode(Method::BwtMtfAc, data, &mut out, false, &Settings::default()).unwrap();
        // The BWT key closes the stream.
        assert_eq!(&out[out.len() - 4..], &[4, 0, 0, 0]);
        round_trip(Method::BwtMtfAc, data, false, &Settings::default());
    }

    #[test]
    fn ids_are_stable() {
        for (i, method) in Method::ALL.iter().enumerate() {
            assert_eq!(method.id() as usize, i);
            assert_eq!(Method::from_id(i as u8).unwrap(), *method);
        }
        assert!(Method::from_id(12).is_err());
        assert_eq!(Method::BwtMtfRleHa.to_string(), "BWT-MTF-RLE-HA");
    }

    #[test]
    fn every_method_round_trips_empty_input() {
        for method in Method::ALL {
            round_trip::<u8>(method, &[], false, &Settings::default());
            round_trip::<u32>(method, &[], true, &Settings::default());
        }
    }

    #[test]
    fn every_method_round_trips_bytes() {
        let mut rng = StdRng::seed_from_u64(0x5049_5045);
        let settings = Settings::new(512, 256).unwrap();
        for method in Method::ALL {
            for len in [1_usize, 2, 37, 1500] {
                let data: Vec<u8> = sample(&mut rng, len, 0, 256);
                round_trip(method, &data, false, &settings);
                round_trip(method, &data, true, &settings);
            }
        }
    }

    #[test]
    fn every_method_round_trips_wide_symbols() {
        let mut rng = StdRng::seed_from_u64(0x57_4944_45);
        let settings = Settings::default();
        for method in Method::ALL {
            for utf8 in [false, true] {
                let narrow: Vec<u16> = sample(&mut rng, 900, 0x400, 40);
                round_trip(method, &narrow, utf8, &settings);
                let wide: Vec<u32> = sample(&mut rng, 900, 0x1_f300, 60);
                round_trip(method, &wide, utf8, &settings);
            }
        }
    }

    #[test]
    fn zero_symbols_survive_the_sentinel() {
        let data = vec![0_u8, 0, 1, 0, 0, 0, 2, 0];
        for method in [Method::BwtMtfAc, Method::BwtMtfRleHa, Method::BwtRle] {
            round_trip(method, &data, false, &Settings::default());
        }
    }

    #[test]
    fn truncated_pipeline_streams_fail() {
        let data = "the quick brown fox jumps over the lazy dog".as_bytes();
        for method in Method::ALL {
            let mut out = vec![];
            encode(method, data, &mut out, false, &Settings::default()).unwrap();
            out.truncate(out.len() - 1);
            let result: Result<Vec<u8>> =
                decode(method, &mut out.as_slice(), false, &Settings::default());
            assert!(result.is_err(), "{} accepted a truncated stream", method);
        }
    }
}
