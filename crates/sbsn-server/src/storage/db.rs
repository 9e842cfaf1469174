//! SQLite database for SBSN users.

sbsn_core::define_database!(UserDatabase, "User database migrations complete");
