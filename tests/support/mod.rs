#![allow(dead_code)]

pub mod fake_vcs;
pub mod svnbrowser_env;
