//! Anchor conventions: IDL descriptor, discriminators, borsh payloads.

use anyhow::{Context, Result, anyhow};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tv_api_types::{Address, Entry};
use tv_chain_client::{ChainError, ChainResult};

use crate::wire::{AccountMeta, Instruction};

pub const INITIALIZE_IX: &str = "startStuffOff";
pub const APPEND_IX: &str = "addGif";
pub const STORAGE_ACCOUNT: &str = "BaseAccount";

pub const DISCRIMINATOR_LEN: usize = 8;

pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn discriminator(preimage: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(preimage.as_bytes());
    let mut out = [0_u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    discriminator(&format!("global:{}", to_snake_case(name)))
}

pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    discriminator(&format!("account:{name}"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Idl {
    pub name: String,
    #[serde(default)]
    pub instructions: Vec<IdlInstruction>,
    #[serde(default)]
    pub accounts: Vec<IdlTypeDef>,
    #[serde(default)]
    pub metadata: Option<IdlMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlInstruction {
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<IdlAccountItem>,
    #[serde(default)]
    pub args: Vec<IdlField>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlAccountItem {
    pub name: String,
    pub is_mut: bool,
    pub is_signer: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlTypeDef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlMetadata {
    pub address: String,
}

impl Idl {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("IDL is not valid JSON")
    }

    pub fn program_id(&self) -> Result<Address> {
        let address = self
            .metadata
            .as_ref()
            .map(|m| m.address.as_str())
            .ok_or_else(|| anyhow!("IDL {} has no metadata.address", self.name))?;
        address
            .parse()
            .with_context(|| format!("IDL program address {address:?}"))
    }

    pub fn instruction(&self, name: &str) -> Option<&IdlInstruction> {
        self.instructions.iter().find(|ix| ix.name == name)
    }

    pub fn has_account(&self, name: &str) -> bool {
        self.accounts.iter().any(|a| a.name == name)
    }
}

impl IdlInstruction {
    /// Builds the instruction, resolving each IDL account name to an address.
    pub fn build<A: BorshSerialize>(
        &self,
        program_id: Address,
        resolve: impl Fn(&str) -> Option<Address>,
        args: &A,
    ) -> ChainResult<Instruction> {
        let accounts = self
            .accounts
            .iter()
            .map(|item| {
                let address = resolve(&item.name).ok_or_else(|| {
                    ChainError::Descriptor(format!(
                        "no address for account {:?} of {}",
                        item.name, self.name
                    ))
                })?;
                Ok(AccountMeta {
                    address,
                    is_signer: item.is_signer,
                    is_writable: item.is_mut,
                })
            })
            .collect::<ChainResult<Vec<_>>>()?;

        let mut data = instruction_discriminator(&self.name).to_vec();
        args.serialize(&mut data)
            .map_err(|e| ChainError::Descriptor(format!("encode {} args: {e}", self.name)))?;

        Ok(Instruction {
            program_id,
            accounts,
            data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ItemStruct {
    pub gif_link: String,
    pub user_address: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BaseAccount {
    pub total_gifs: u64,
    pub gif_list: Vec<ItemStruct>,
}

impl BaseAccount {
    /// Decodes raw account data. Trailing allocation padding is ignored.
    pub fn decode(data: &[u8]) -> ChainResult<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(ChainError::AccountDecode(format!(
                "account data is {} bytes, shorter than the discriminator",
                data.len()
            )));
        }
        let (tag, mut body) = data.split_at(DISCRIMINATOR_LEN);
        if tag != account_discriminator(STORAGE_ACCOUNT) {
            return Err(ChainError::AccountDecode(format!(
                "account is not a {STORAGE_ACCOUNT}"
            )));
        }
        BaseAccount::deserialize(&mut body).map_err(|e| ChainError::AccountDecode(e.to_string()))
    }

    pub fn entries(self) -> Vec<Entry> {
        self.gif_list
            .into_iter()
            .map(|item| Entry {
                link: item.gif_link,
                submitter: Address::new(item.user_address),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLED_IDL: &str = include_str!("../../../config/idl.json");

    #[test]
    fn snake_case_matches_anchor() {
        assert_eq!(to_snake_case("startStuffOff"), "start_stuff_off");
        assert_eq!(to_snake_case("addGif"), "add_gif");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn discriminators_match_known_values() {
        assert_eq!(
            instruction_discriminator(APPEND_IX),
            [171, 74, 141, 100, 33, 70, 87, 155]
        );
        assert_eq!(
            instruction_discriminator(INITIALIZE_IX),
            [126, 54, 85, 33, 226, 32, 195, 32]
        );
        assert_eq!(
            account_discriminator(STORAGE_ACCOUNT),
            [16, 90, 130, 242, 159, 10, 232, 133]
        );
    }

    #[test]
    fn bundled_idl_describes_program() {
        let idl = Idl::parse(BUNDLED_IDL).expect("idl");
        assert_eq!(
            idl.program_id().expect("program id").to_string(),
            "HJPXDiJK1z4LqgAbGDoARvo71wGcbcwWScEbcrYQRPm6"
        );
        assert!(idl.has_account(STORAGE_ACCOUNT));
        let init = idl.instruction(INITIALIZE_IX).expect("init");
        assert_eq!(init.accounts.len(), 3);
        assert!(init.accounts[0].is_signer);
        let append = idl.instruction(APPEND_IX).expect("append");
        assert_eq!(append.args[0].name, "gifLink");
    }

    #[test]
    fn append_instruction_encodes_string_arg() {
        let idl = Idl::parse(BUNDLED_IDL).expect("idl");
        let storage = Address::new([2; 32]);
        let user = Address::new([1; 32]);
        let resolve = |name: &str| match name {
            "baseAccount" => Some(storage),
            "user" => Some(user),
            _ => None,
        };
        let ix = idl
            .instruction(APPEND_IX)
            .expect("append")
            .build(Address::new([9; 32]), resolve, &"hi".to_string())
            .expect("build");

        assert_eq!(&ix.data[..8], &instruction_discriminator(APPEND_IX));
        assert_eq!(&ix.data[8..], &[2, 0, 0, 0, b'h', b'i']);
        assert_eq!(ix.accounts[0].address, storage);
        assert!(!ix.accounts[0].is_signer);
        assert!(ix.accounts[1].is_signer);

        let missing = idl
            .instruction(INITIALIZE_IX)
            .expect("init")
            .build(Address::new([9; 32]), resolve, &());
        assert!(matches!(missing, Err(ChainError::Descriptor(_))));
    }

    #[test]
    fn base_account_decodes_with_padding() {
        let account = BaseAccount {
            total_gifs: 2,
            gif_list: vec![
                ItemStruct {
                    gif_link: "https://a.example/1.gif".into(),
                    user_address: [3; 32],
                },
                ItemStruct {
                    gif_link: "https://a.example/2.gif".into(),
                    user_address: [4; 32],
                },
            ],
        };
        let mut data = account_discriminator(STORAGE_ACCOUNT).to_vec();
        data.extend(borsh::to_vec(&account).expect("encode"));
        data.extend([0_u8; 64]);

        let decoded = BaseAccount::decode(&data).expect("decode");
        let entries = decoded.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].link, "https://a.example/1.gif");
        assert_eq!(entries[1].submitter, Address::new([4; 32]));
    }

    #[test]
    fn base_account_rejects_foreign_data() {
        assert!(matches!(
            BaseAccount::decode(&[1, 2, 3]),
            Err(ChainError::AccountDecode(_))
        ));
        let mut wrong = account_discriminator("Other").to_vec();
        wrong.extend([0_u8; 16]);
        assert!(matches!(
            BaseAccount::decode(&wrong),
            Err(ChainError::AccountDecode(_))
        ));
    }
}
