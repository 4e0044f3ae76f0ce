pub mod position_utils;
