/*!
# Staff Directory Domain

Identity administration for the clinical staff directory, laid out with
hexagonal architecture principles.

This crate provides:
- The staff `Identity` model and its validation rules
- The `IdentityGateway` port the orchestration layer drives
- `IdentityManagementService`, the command/query surface
- Adapters for a Cognito user pool and an in-memory test double

## Architecture

```text
┌─────────────────────────────────────────────────────────────┐
│                Application Layer                            │
├─────────────────────────────────────────────────────────────┤
│  • IdentityManagementService   • ErrorTranslator            │
└─────────────────────────────────────────────────────────────┘
                              │
┌─────────────────────────────────────────────────────────────┐
│              Domain Layer (Entities, Rules, Ports)          │
├─────────────────────────────────────────────────────────────┤
│  • Identity / NewIdentity      • validation                 │
│  • IdentityGateway             • ConfigurationPort          │
└─────────────────────────────────────────────────────────────┘
                              │
┌─────────────────────────────────────────────────────────────┐
│              Infrastructure Layer (Adapters)                │
├─────────────────────────────────────────────────────────────┤
│  • CognitoIdentityGateway      • EnvConfigurationAdapter    │
│  • InMemoryIdentityGateway     • telemetry                  │
└─────────────────────────────────────────────────────────────┘
```

## Usage

```rust,ignore
use staff_directory_domain::{
    application::services::IdentityManagementService,
    infrastructure::adapters::{CognitoIdentityGateway, EnvConfigurationAdapter},
};

let config = EnvConfigurationAdapter::new()?;
let gateway = CognitoIdentityGateway::from_config(&config)?;
let service = IdentityManagementService::new(Arc::new(gateway));

let nurse = service.find_by_handle("nurse01").await?;
```
*/

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::ports::*;
pub use application::services::*;
pub use domain::entities::*;
pub use domain::errors::*;
pub use domain::validation::ValidationRule;
