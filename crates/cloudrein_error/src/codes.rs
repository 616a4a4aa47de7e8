//! Well-known provider error codes.
//!
//! Throttling signals drain rate-limiter buckets. The not-found family is
//! what "wait until the resource is visible" loops usually pass as their
//! retryable set, since newly created resources can take a while to
//! propagate through an eventually consistent API.

/// The provider is throttling this client.
pub const THROTTLING: &str = "Throttling";
/// The account exceeded its request rate.
pub const REQUEST_LIMIT_EXCEEDED: &str = "RequestLimitExceeded";

/// Codes that count as a server-side throttling signal.
pub const THROTTLING_CODES: &[&str] = &[THROTTLING, REQUEST_LIMIT_EXCEEDED];

/// Route table does not exist (yet).
pub const ROUTE_TABLE_NOT_FOUND: &str = "InvalidRouteTableID.NotFound";
/// Subnet does not exist (yet).
pub const SUBNET_NOT_FOUND: &str = "InvalidSubnetID.NotFound";
/// Security group does not exist (yet).
pub const GROUP_NOT_FOUND: &str = "InvalidGroup.NotFound";
/// VPC does not exist (yet).
pub const VPC_NOT_FOUND: &str = "InvalidVpcID.NotFound";
/// Internet gateway does not exist (yet).
pub const INTERNET_GATEWAY_NOT_FOUND: &str = "InvalidInternetGatewayID.NotFound";
/// NAT gateway does not exist (yet).
pub const NAT_GATEWAY_NOT_FOUND: &str = "InvalidNatGatewayID.NotFound";
/// Gateway does not exist (yet).
pub const GATEWAY_NOT_FOUND: &str = "InvalidGatewayID.NotFound";
/// Classic load balancer does not exist.
pub const LOAD_BALANCER_NOT_FOUND: &str = "LoadBalancerNotFound";
/// Launch template name is unknown.
pub const LAUNCH_TEMPLATE_NAME_NOT_FOUND: &str = "InvalidLaunchTemplateName.NotFoundException";
/// Instance does not exist.
pub const INSTANCE_NOT_FOUND: &str = "InvalidInstanceID.NotFound";
/// Generic resource-not-found code used by newer services.
pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

/// Codes that mean "the resource is not there".
pub const NOT_FOUND_CODES: &[&str] = &[
    ROUTE_TABLE_NOT_FOUND,
    SUBNET_NOT_FOUND,
    GROUP_NOT_FOUND,
    VPC_NOT_FOUND,
    INTERNET_GATEWAY_NOT_FOUND,
    NAT_GATEWAY_NOT_FOUND,
    GATEWAY_NOT_FOUND,
    LOAD_BALANCER_NOT_FOUND,
    LAUNCH_TEMPLATE_NAME_NOT_FOUND,
    INSTANCE_NOT_FOUND,
    RESOURCE_NOT_FOUND,
];

/// True if `code` is a throttling signal.
pub fn is_throttling(code: &str) -> bool {
    THROTTLING_CODES.contains(&code)
}

/// True if `code` is in the not-found family.
pub fn is_not_found(code: &str) -> bool {
    NOT_FOUND_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttling_codes() {
        assert!(is_throttling("Throttling"));
        assert!(is_throttling("RequestLimitExceeded"));
        assert!(!is_throttling("throttling"));
        assert!(!is_throttling(SUBNET_NOT_FOUND));
    }

    #[test]
    fn test_not_found_codes() {
        assert!(is_not_found("InvalidSubnetID.NotFound"));
        assert!(is_not_found(LOAD_BALANCER_NOT_FOUND));
        assert!(!is_not_found(THROTTLING));
    }
}
