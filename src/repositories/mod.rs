use sqlx::PgPool;

pub mod memory_repo;
pub mod posts_repo;

pub use memory_repo::InMemoryPostRepo;
pub use posts_repo::PostRepository;

#[derive(Clone)]
pub struct PostgresRepo {
    pool: PgPool,
}

impl PostgresRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> crate::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
