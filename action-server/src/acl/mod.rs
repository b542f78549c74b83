//! 订单动作权限模块
//!
//! - [`PermissionResolver`] - 按角色生成动作权限表 (fail-open)
//! - [`RoleGrantLookup`] - 宿主角色规则接口
//! - [`StaticRoleRules`] - 内存/JSON 规则表

pub mod resolver;
pub mod rules;

pub use resolver::{ActionSettings, PermissionResolver};
pub use rules::{
    ACTION_RESOURCE_PREFIX, RoleGrantLookup, RoleId, RoleRules, RulePermission, RulesError,
    StaticRoleRules, action_resource_token,
};
