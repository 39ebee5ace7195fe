//! sea-orm storage: entities, row mapping, repositories and migrations.

pub mod entity;
pub mod mapper;
pub mod migrations;

mod certification_repo;
mod dive_repo;
mod gear_repo;
mod plan_repo;
mod preferences_repo;
mod user_repo;


pub use certification_repo::SeaOrmCertificationRepository;
pub use dive_repo::SeaOrmDiveRepository;
pub use gear_repo::SeaOrmGearRepository;
pub use plan_repo::SeaOrmPlanRepository;
pub use preferences_repo::SeaOrmPreferencesRepository;
pub use user_repo::SeaOrmUserRepository;
