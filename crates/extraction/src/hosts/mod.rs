// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Host language bindings

pub mod rust;
pub mod typescript;

pub use rust::RustBinding;
pub use typescript::TypeScriptBinding;

use embedded_sql_ir::HostLanguage;

use crate::shape::HostBinding;

/// Binding for a host language
pub fn binding_for(host: HostLanguage) -> &'static dyn HostBinding {
    match host {
        HostLanguage::TypeScript | HostLanguage::Tsx => &TypeScriptBinding,
        HostLanguage::Rust => &RustBinding,
    }
}
