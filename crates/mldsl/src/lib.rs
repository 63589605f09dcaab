#![doc = include_str!("../../../README.md")]

mod api;
mod compile;
mod config;
mod error;
mod extract;
mod text;

pub use crate::{
    api::{
        ApiEnum, ApiFunc, ApiMap, FuncMeta, NameOverride, Param, ParamSource, build_api, parse_api_json,
        render_api_json, validate_api_contract,
    },
    compile::{
        Block, NO_ARGS, Plan, PlanEntry, collapse_autosplit_trampolines, compile_source, promote_autosplit_targets,
    },
    config::Config,
    error::{Error, Result},
    extract::{
        ActionRecord, ArgBinding, Catalog, EnumSlot, ExtractDiagnostics, Mode, RawAction, SlotItem, VariantInfo,
        extract_catalog, parse_dump, read_dump_file,
    },
};
