use sea_orm_migration::prelude::*;

/// `cargo run -p migration -- up` applies the campus schema to DATABASE_URL
#[async_std::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
