pub mod sarif_utils;
