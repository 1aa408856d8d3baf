//! Test helpers: a small ZIP writer and a P-256 signer producing
//! comment-signed packages.

#![allow(dead_code)]

use std::io::Write;

use base64::{engine::general_purpose::STANDARD as base64_engine, Engine};
use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};

pub const SIGNING_BLOCK_MAGIC: &[u8; 16] = b"APK Sig Block 42";

/// DER prefix of a P-256 SubjectPublicKeyInfo, up to the point bytes.
const P256_SPKI_PREFIX: [u8; 26] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08, 0x2a,
    0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];

pub struct TestKey {
    pair: EcdsaKeyPair,
    rng: SystemRandom,
}

impl TestKey {
    pub fn generate() -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        let pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &rng)
            .unwrap();
        Self { pair, rng }
    }

    pub fn public_point(&self) -> Vec<u8> {
        self.pair.public_key().as_ref().to_vec()
    }

    /// Base64 SubjectPublicKeyInfo, the form `VerifierConfig` expects.
    pub fn public_key_base64(&self) -> String {
        let mut der = P256_SPKI_PREFIX.to_vec();
        der.extend_from_slice(&self.public_point());
        base64_engine.encode(der)
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.pair.sign(&self.rng, message).unwrap().as_ref().to_vec()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    None,
    /// 12-byte descriptor without the `PK\x07\x08` signature.
    Unsigned,
    /// 16-byte descriptor starting with the signature.
    Signed,
}

#[derive(Debug, Clone)]
pub struct Entry {
    /// Name bytes, not necessarily UTF-8.
    pub name: Vec<u8>,
    /// Bytes as stored in the archive.
    pub data: Vec<u8>,
    pub uncompressed_size: u32,
    pub method: u16,
    pub descriptor: Descriptor,
    pub local_extra: Vec<u8>,
    pub central_extra: Vec<u8>,
    pub central_comment: Vec<u8>,
    /// Unreferenced bytes written after this entry.
    pub gap_after: usize,
}

impl Entry {
    pub fn stored(name: impl AsRef<[u8]>, data: &[u8]) -> Self {
        Self {
            name: name.as_ref().to_vec(),
            data: data.to_vec(),
            uncompressed_size: data.len() as u32,
            method: 0,
            descriptor: Descriptor::None,
            local_extra: Vec::new(),
            central_extra: Vec::new(),
            central_comment: Vec::new(),
            gap_after: 0,
        }
    }

    pub fn deflated(name: impl AsRef<[u8]>, data: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        Self {
            data: encoder.finish().unwrap(),
            uncompressed_size: data.len() as u32,
            method: 8,
            ..Self::stored(name, b"")
        }
    }

    fn flags(&self) -> u16 {
        if self.descriptor == Descriptor::None { 0 } else { 0x0008 }
    }

    fn crc(&self) -> u32 {
        let mut crc = Crc::new();
        crc.update(&self.data);
        crc.sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZipBuilder {
    pub entries: Vec<Entry>,
    /// Bytes between the last entry and the central directory.
    pub signing_block: Option<Vec<u8>>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A typical small package.
    pub fn sample() -> Self {
        Self::new()
            .entry(Entry::stored(
                "AndroidManifest.xml",
                b"<manifest package=\"org.chromium.webapk.a\"/>",
            ))
            .entry(Entry::deflated("classes.dex", &b"dex\n035\0".repeat(40)))
            .entry(Entry::stored("res/icon.png", &[0x89, b'P', b'N', b'G', 1, 2, 3, 4]))
            .entry(Entry::stored("META-INF/CERT.SF", b"Signature-Version: 1.0\r\n"))
            .entry(Entry::stored("META-INF/CERT.RSA", &[0x30, 0x82, 0x01]))
            .entry(Entry::stored("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\r\n"))
    }

    pub fn entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn stored(self, name: impl AsRef<[u8]>, data: &[u8]) -> Self {
        self.entry(Entry::stored(name, data))
    }

    /// A `size`-byte signing block ending with the APK signing block magic.
    pub fn signing_block(mut self, size: usize) -> Self {
        assert!(size >= SIGNING_BLOCK_MAGIC.len());
        let mut block = vec![0xA5; size - SIGNING_BLOCK_MAGIC.len()];
        block.extend_from_slice(SIGNING_BLOCK_MAGIC);
        self.signing_block = Some(block);
        self
    }

    pub fn entry_mut(&mut self, name: impl AsRef<[u8]>) -> &mut Entry {
        self.entries
            .iter_mut()
            .find(|entry| entry.name == name.as_ref())
            .unwrap()
    }

    /// The stream a signer signs: name-ordered, META-INF/ skipped,
    /// length-prefixed name and data.
    pub fn signed_stream(&self) -> Vec<u8> {
        let mut sorted: Vec<&Entry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = Vec::new();
        for entry in sorted.into_iter().filter(|e| !e.name.starts_with(b"META-INF/")) {
            out.extend_from_slice(&(entry.name.len() as u32).to_le_bytes());
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            out.extend_from_slice(&entry.data);
        }
        out
    }

    /// Archive comment carrying a signature over the current contents.
    pub fn signed_comment(&self, key: &TestKey) -> String {
        format!("webapk:1:{}", hex::encode(key.sign(&self.signed_stream())))
    }

    pub fn build_signed(&self, key: &TestKey) -> Vec<u8> {
        self.build(&self.signed_comment(key))
    }

    pub fn build(&self, comment: &str) -> Vec<u8> {
        let mut out = Vec::new();
        let mut offsets = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            offsets.push(out.len() as u32);
            put_u32(&mut out, 0x0403_4b50);
            put_u16(&mut out, 20);
            put_u16(&mut out, entry.flags());
            put_u16(&mut out, entry.method);
            put_u16(&mut out, 0); // time
            put_u16(&mut out, 0x21); // date
            put_u32(&mut out, entry.crc());
            put_u32(&mut out, entry.data.len() as u32);
            put_u32(&mut out, entry.uncompressed_size);
            put_u16(&mut out, entry.name.len() as u16);
            put_u16(&mut out, entry.local_extra.len() as u16);
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(&entry.local_extra);
            out.extend_from_slice(&entry.data);

            if entry.descriptor == Descriptor::Signed {
                put_u32(&mut out, 0x0807_4b50);
            }
            if entry.descriptor != Descriptor::None {
                put_u32(&mut out, entry.crc());
                put_u32(&mut out, entry.data.len() as u32);
                put_u32(&mut out, entry.uncompressed_size);
            }

            out.extend(std::iter::repeat_n(0u8, entry.gap_after));
        }

        if let Some(block) = &self.signing_block {
            out.extend_from_slice(block);
        }

        let cd_offset = out.len() as u32;
        for (entry, offset) in self.entries.iter().zip(&offsets) {
            put_u32(&mut out, 0x0201_4b50);
            put_u16(&mut out, 20);
            put_u16(&mut out, 20);
            put_u16(&mut out, entry.flags());
            put_u16(&mut out, entry.method);
            put_u16(&mut out, 0);
            put_u16(&mut out, 0x21);
            put_u32(&mut out, entry.crc());
            put_u32(&mut out, entry.data.len() as u32);
            put_u32(&mut out, entry.uncompressed_size);
            put_u16(&mut out, entry.name.len() as u16);
            put_u16(&mut out, entry.central_extra.len() as u16);
            put_u16(&mut out, entry.central_comment.len() as u16);
            put_u16(&mut out, 0); // disk start
            put_u16(&mut out, 0); // internal attributes
            put_u32(&mut out, 0); // external attributes
            put_u32(&mut out, *offset);
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(&entry.central_extra);
            out.extend_from_slice(&entry.central_comment);
        }
        let cd_size = out.len() as u32 - cd_offset;

        put_u32(&mut out, 0x0605_4b50);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, self.entries.len() as u16);
        put_u16(&mut out, self.entries.len() as u16);
        put_u32(&mut out, cd_size);
        put_u32(&mut out, cd_offset);
        put_u16(&mut out, comment.len() as u16);
        out.extend_from_slice(comment.as_bytes());
        out
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
