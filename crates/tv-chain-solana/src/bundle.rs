//! Build-time program configuration, assembled once before first render.

use anyhow::{Context, Result, bail};
use tv_api_types::{Address, Cluster, Commitment};
use tv_chain_client::{ChainError, ChainResult};
use tv_crypto::{Ed25519Signer, Signer};

use crate::anchor::{APPEND_IX, INITIALIZE_IX, Idl, IdlInstruction, STORAGE_ACCOUNT};
use crate::wire::{Instruction, SYSTEM_PROGRAM_ID};

#[derive(Debug, Clone, Default)]
pub struct BundleSettings {
    pub cluster: Cluster,
    pub rpc_url: Option<String>,
    pub commitment: Commitment,
}

pub struct ProgramBundle {
    cluster: Cluster,
    rpc_url: String,
    commitment: Commitment,
    program_id: Address,
    idl: Idl,
    storage: Ed25519Signer,
}

impl ProgramBundle {
    pub fn from_assets(idl_json: &str, keypair_json: &str, settings: BundleSettings) -> Result<Self> {
        let idl = Idl::parse(idl_json)?;
        let program_id = idl.program_id()?;
        for name in [INITIALIZE_IX, APPEND_IX] {
            if idl.instruction(name).is_none() {
                bail!("IDL {} has no {name} instruction", idl.name);
            }
        }
        if !idl.has_account(STORAGE_ACCOUNT) {
            bail!("IDL {} has no {STORAGE_ACCOUNT} account", idl.name);
        }

        let storage =
            Ed25519Signer::from_keypair_json(keypair_json).context("storage account keypair")?;
        let rpc_url = settings
            .rpc_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| settings.cluster.rpc_url().to_string());

        Ok(Self {
            cluster: settings.cluster,
            rpc_url,
            commitment: settings.commitment,
            program_id,
            idl,
            storage,
        })
    }

    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub fn program_id(&self) -> Address {
        self.program_id
    }

    pub fn storage_account(&self) -> Address {
        self.storage.address()
    }

    pub(crate) fn storage_signer(&self) -> &Ed25519Signer {
        &self.storage
    }

    fn ix(&self, name: &str) -> ChainResult<&IdlInstruction> {
        self.idl
            .instruction(name)
            .ok_or_else(|| ChainError::Descriptor(format!("IDL has no {name} instruction")))
    }

    fn resolver(&self, user: Address) -> impl Fn(&str) -> Option<Address> {
        let storage = self.storage_account();
        move |name: &str| match name {
            "baseAccount" => Some(storage),
            "user" => Some(user),
            "systemProgram" => Some(SYSTEM_PROGRAM_ID),
            _ => None,
        }
    }

    pub fn append_instruction(&self, user: &Address, link: &str) -> ChainResult<Instruction> {
        self.ix(APPEND_IX)?
            .build(self.program_id, self.resolver(*user), &link.to_string())
    }

    pub fn initialize_instruction(&self, user: &Address) -> ChainResult<Instruction> {
        self.ix(INITIALIZE_IX)?
            .build(self.program_id, self.resolver(*user), &())
    }
}
