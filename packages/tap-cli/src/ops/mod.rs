pub mod tap_generate;
pub mod tap_odata_url;
pub mod tap_paginate;
pub mod tap_status;
