// Links every API package crate so its proto provider registration is
// collected by `inventory`. Add new package crates here.
#![allow(unused_imports)]

use ansys_api_platform_instancemanagement as _;
