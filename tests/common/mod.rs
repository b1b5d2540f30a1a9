//! 构造合成 NCM 容器的测试工具。

use aes::{Aes128, cipher::generic_array::GenericArray};
use base64::{Engine as _, engine::general_purpose};
use block_padding::Pkcs7;
use cipher::{BlockEncryptMut, KeyInit};
use ecb::Encryptor as EcbModeEncryptor;

use ncm_helper_rs::crypto::{CORE_KEY, KeyBox, META_KEY};

fn aes_ecb_encrypt(plaintext: &[u8], key: &[u8; 16]) -> Vec<u8> {
    let cipher = EcbModeEncryptor::<Aes128>::new(GenericArray::from_slice(key));
    let msg_len = plaintext.len();
    let mut buffer = plaintext.to_vec();
    buffer.resize((msg_len / 16 + 1) * 16, 0);
    cipher
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, msg_len)
        .unwrap()
        .to_vec()
}

fn xor(data: &[u8], byte: u8) -> Vec<u8> {
    data.iter().map(|b| b ^ byte).collect()
}

/// 合成容器的各个组成部分。
pub struct SyntheticNcm {
    pub actual_key: Vec<u8>,
    pub meta_json: Vec<u8>,
    pub cover: Vec<u8>,
    pub audio: Vec<u8>,
}

impl SyntheticNcm {
    pub fn new(actual_key: &[u8], meta_json: &[u8], audio: &[u8]) -> Self {
        Self {
            actual_key: actual_key.to_vec(),
            meta_json: meta_json.to_vec(),
            cover: b"\xff\xd8\xff\xe0 fake jpeg".to_vec(),
            audio: audio.to_vec(),
        }
    }

    pub fn key_block(&self) -> Vec<u8> {
        let plaintext = [b"neteasecloudmusic".as_slice(), &self.actual_key].concat();
        xor(&aes_ecb_encrypt(&plaintext, &CORE_KEY), 0x64)
    }

    pub fn meta_block(&self) -> Vec<u8> {
        let plaintext = [b"music:".as_slice(), &self.meta_json].concat();
        let encoded = general_purpose::STANDARD.encode(aes_ecb_encrypt(&plaintext, &META_KEY));
        xor(
            &[b"163 key(Don't modify):".as_slice(), encoded.as_bytes()].concat(),
            0x63,
        )
    }

    pub fn encrypted_audio(&self) -> Vec<u8> {
        let mut audio = self.audio.clone();
        KeyBox::new(&self.actual_key).unwrap().mask().apply(&mut audio);
        audio
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = b"CTENFDAM".to_vec();
        out.extend_from_slice(&[0x01, 0x69]);
        for block in [self.key_block(), self.meta_block()] {
            out.extend_from_slice(&(block.len() as u32).to_le_bytes());
            out.extend_from_slice(&block);
        }
        out.extend_from_slice(&[0u8; 4 + 5]);
        out.extend_from_slice(&(self.cover.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.cover);
        out.extend_from_slice(&self.encrypted_audio());
        out
    }
}

pub fn sample_audio(len: usize) -> Vec<u8> {
    let mut audio = b"ID3\x04\0\0\0\0\0\0".to_vec();
    audio.extend((0..len).map(|i| (i * 13 % 256) as u8));
    audio
}
