#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    /// HR and admins may adjudicate any employee's leave; everyone else only
    /// their direct reports'.
    pub fn reviews_everyone(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_hr_and_admin_review_everyone() {
        assert!(Role::Admin.reviews_everyone());
        assert!(Role::Hr.reviews_everyone());
        assert!(!Role::Employee.reviews_everyone());
    }

    #[test]
    fn unknown_role_id() {
        assert_eq!(Role::from_id(9), None);
        assert_eq!(Role::from_id(4), None);
        assert_eq!(Role::from_id(2), Some(Role::Hr));
    }
}
