//! Legacy Solana transaction wire format.
//!
//! Only what the portal needs: compile a message from instructions,
//! collect signatures, serialize. Multi-byte lengths use compact-u16.

use tv_api_types::Address;
use tv_chain_client::{ChainError, ChainResult};

pub const SYSTEM_PROGRAM_ID: Address = Address::new([0; 32]);
pub const SIGNATURE_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Address,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Address>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

pub fn encode_compact_u16(value: u16, out: &mut Vec<u8>) {
    let mut rest = value;
    loop {
        let mut byte = (rest & 0x7f) as u8;
        rest >>= 7;
        if rest == 0 {
            out.push(byte);
            return;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

fn compact_len(len: usize, what: &str, out: &mut Vec<u8>) -> ChainResult<()> {
    let len = u16::try_from(len)
        .map_err(|_| ChainError::Signing(format!("too many {what}: {len}")))?;
    encode_compact_u16(len, out);
    Ok(())
}

#[derive(Clone, Copy)]
struct KeyFlags {
    address: Address,
    is_signer: bool,
    is_writable: bool,
}

impl Message {
    /// Orders keys as writable signers (payer first), read-only signers,
    /// writable non-signers, then read-only non-signers.
    pub fn compile(
        payer: &Address,
        instructions: &[Instruction],
        recent_blockhash: [u8; 32],
    ) -> ChainResult<Self> {
        let mut seen: Vec<KeyFlags> = vec![KeyFlags {
            address: *payer,
            is_signer: true,
            is_writable: true,
        }];

        let mut note = |address: Address, is_signer: bool, is_writable: bool| {
            if let Some(existing) = seen.iter_mut().find(|k| k.address == address) {
                existing.is_signer |= is_signer;
                existing.is_writable |= is_writable;
            } else {
                seen.push(KeyFlags {
                    address,
                    is_signer,
                    is_writable,
                });
            }
        };

        for ix in instructions {
            for meta in &ix.accounts {
                note(meta.address, meta.is_signer, meta.is_writable);
            }
            note(ix.program_id, false, false);
        }

        let group = |signer: bool, writable: bool| {
            seen.iter()
                .filter(move |k| k.is_signer == signer && k.is_writable == writable)
                .map(|k| k.address)
        };
        let writable_signed: Vec<Address> = group(true, true).collect();
        let readonly_signed: Vec<Address> = group(true, false).collect();
        let writable_unsigned: Vec<Address> = group(false, true).collect();
        let readonly_unsigned: Vec<Address> = group(false, false).collect();

        let to_u8 = |n: usize, what: &str| {
            u8::try_from(n).map_err(|_| ChainError::Signing(format!("too many {what}: {n}")))
        };
        let header = MessageHeader {
            num_required_signatures: to_u8(
                writable_signed.len() + readonly_signed.len(),
                "signers",
            )?,
            num_readonly_signed: to_u8(readonly_signed.len(), "read-only signers")?,
            num_readonly_unsigned: to_u8(readonly_unsigned.len(), "read-only accounts")?,
        };

        let account_keys: Vec<Address> = writable_signed
            .into_iter()
            .chain(readonly_signed)
            .chain(writable_unsigned)
            .chain(readonly_unsigned)
            .collect();
        let index_of = |address: &Address| -> ChainResult<u8> {
            let position = account_keys
                .iter()
                .position(|k| k == address)
                .ok_or_else(|| ChainError::Signing(format!("account {address} missing from message")))?;
            to_u8(position, "accounts")
        };

        let mut compiled = Vec::with_capacity(instructions.len());
        for ix in instructions {
            let accounts = ix
                .accounts
                .iter()
                .map(|meta| index_of(&meta.address))
                .collect::<ChainResult<Vec<u8>>>()?;
            compiled.push(CompiledInstruction {
                program_id_index: index_of(&ix.program_id)?,
                accounts,
                data: ix.data.clone(),
            });
        }

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    pub fn signers(&self) -> &[Address] {
        &self.account_keys[..usize::from(self.header.num_required_signatures)]
    }

    pub fn serialize(&self) -> ChainResult<Vec<u8>> {
        let mut out = vec![
            self.header.num_required_signatures,
            self.header.num_readonly_signed,
            self.header.num_readonly_unsigned,
        ];
        compact_len(self.account_keys.len(), "accounts", &mut out)?;
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }
        out.extend_from_slice(&self.recent_blockhash);
        compact_len(self.instructions.len(), "instructions", &mut out)?;
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            compact_len(ix.accounts.len(), "instruction accounts", &mut out)?;
            out.extend_from_slice(&ix.accounts);
            compact_len(ix.data.len(), "instruction bytes", &mut out)?;
            out.extend_from_slice(&ix.data);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    signatures: Vec<Option<[u8; SIGNATURE_LEN]>>,
    message: Message,
}

impl Transaction {
    pub fn new(message: Message) -> Self {
        let slots = usize::from(message.header.num_required_signatures);
        Self {
            signatures: vec![None; slots],
            message,
        }
    }

    pub fn add_signature(&mut self, signer: &Address, signature: [u8; SIGNATURE_LEN]) -> ChainResult<()> {
        let slot = self
            .message
            .signers()
            .iter()
            .position(|k| k == signer)
            .ok_or_else(|| ChainError::Signing(format!("{signer} is not a required signer")))?;
        self.signatures[slot] = Some(signature);
        Ok(())
    }

    pub fn missing_signers(&self) -> Vec<Address> {
        self.message
            .signers()
            .iter()
            .zip(&self.signatures)
            .filter(|(_, sig)| sig.is_none())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn serialize(&self) -> ChainResult<Vec<u8>> {
        let missing = self.missing_signers();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
            return Err(ChainError::Signing(format!(
                "missing signatures from {}",
                names.join(", ")
            )));
        }
        let mut out = Vec::new();
        compact_len(self.signatures.len(), "signatures", &mut out)?;
        for signature in self.signatures.iter().flatten() {
            out.extend_from_slice(signature);
        }
        out.extend_from_slice(&self.message.serialize()?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> Address {
        Address::new([byte; 32])
    }

    fn meta(address: Address, is_signer: bool, is_writable: bool) -> AccountMeta {
        AccountMeta {
            address,
            is_signer,
            is_writable,
        }
    }

    #[test]
    fn compact_u16_boundaries() {
        let cases: [(u16, &[u8]); 5] = [
            (0, &[0x00]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (16_383, &[0xff, 0x7f]),
            (16_384, &[0x80, 0x80, 0x01]),
        ];
        for (value, expected) in cases {
            let mut out = Vec::new();
            encode_compact_u16(value, &mut out);
            assert_eq!(out, expected, "value {value}");
        }
    }

    #[test]
    fn initialize_shape_orders_signers_first() {
        let user = key(1);
        let storage = key(2);
        let program = key(9);
        let ix = Instruction {
            program_id: program,
            accounts: vec![
                meta(storage, true, true),
                meta(user, true, true),
                meta(SYSTEM_PROGRAM_ID, false, false),
            ],
            data: vec![1, 2, 3],
        };

        let message = Message::compile(&user, &[ix], [5; 32]).expect("compile");
        assert_eq!(
            message.header,
            MessageHeader {
                num_required_signatures: 2,
                num_readonly_signed: 0,
                num_readonly_unsigned: 2,
            }
        );
        assert_eq!(message.account_keys, vec![user, storage, SYSTEM_PROGRAM_ID, program]);
        assert_eq!(message.instructions[0].program_id_index, 3);
        assert_eq!(message.instructions[0].accounts, vec![1, 0, 2]);
        assert_eq!(message.signers(), &[user, storage]);
    }

    #[test]
    fn append_shape_keeps_storage_writable_unsigned() {
        let user = key(1);
        let storage = key(2);
        let program = key(9);
        let ix = Instruction {
            program_id: program,
            accounts: vec![meta(storage, false, true), meta(user, true, true)],
            data: vec![],
        };

        let message = Message::compile(&user, &[ix], [0; 32]).expect("compile");
        assert_eq!(message.header.num_required_signatures, 1);
        assert_eq!(message.header.num_readonly_unsigned, 1);
        assert_eq!(message.account_keys, vec![user, storage, program]);
        assert_eq!(message.instructions[0].accounts, vec![1, 0]);

        let bytes = message.serialize().expect("serialize");
        assert_eq!(&bytes[..4], &[1, 0, 1, 3]);
        assert_eq!(bytes.len(), 3 + 1 + 3 * 32 + 32 + 1 + 1 + 1 + 2 + 1);
    }

    #[test]
    fn transaction_requires_every_signer() {
        let user = key(1);
        let storage = key(2);
        let ix = Instruction {
            program_id: key(9),
            accounts: vec![meta(storage, true, true), meta(user, true, true)],
            data: vec![7],
        };
        let message = Message::compile(&user, &[ix], [0; 32]).expect("compile");
        let message_len = message.serialize().expect("serialize").len();
        let mut tx = Transaction::new(message);

        tx.add_signature(&storage, [0xbb; 64]).expect("storage signs");
        assert_eq!(tx.missing_signers(), vec![user]);
        assert!(tx.serialize().is_err());
        assert!(tx.add_signature(&key(3), [0; 64]).is_err());

        tx.add_signature(&user, [0xaa; 64]).expect("user signs");
        let bytes = tx.serialize().expect("serialize");
        assert_eq!(bytes[0], 2);
        assert_eq!(bytes[1], 0xaa);
        assert_eq!(bytes[65], 0xbb);
        assert_eq!(bytes.len(), 1 + 2 * 64 + message_len);
    }
}
