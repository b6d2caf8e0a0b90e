use super::{Kernel, KernelError, KernelParameters};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Prefix the parameters of each side of a composite kernel with `k1__` and
/// `k2__`
fn merge_parameters(a: KernelParameters, b: KernelParameters) -> KernelParameters {
    a.into_iter()
        .map(|(name, value)| (format!("k1__{name}"), value))
        .chain(b.into_iter().map(|(name, value)| (format!("k2__{name}"), value)))
        .collect()
}

/// Route a prefixed parameter name to the side of the composite it belongs to
fn set_composite_parameter<A: Kernel, B: Kernel>(
    a: &mut A,
    b: &mut B,
    name: &str,
    value: f64,
) -> Result<(), KernelError> {
    if let Some(inner) = name.strip_prefix("k1__") {
        a.set_parameter(inner, value)
    } else if let Some(inner) = name.strip_prefix("k2__") {
        b.set_parameter(inner, value)
    } else {
        Err(KernelError::UnknownParameter(name.to_string()))
    }
}

/// Kernel representing the sum of two other kernels
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct AddKernel<A, B>
where
    A: Kernel,
    B: Kernel,
{
    a: A,
    b: B,
}

impl<A, B, C> std::ops::Mul<C> for AddKernel<A, B>
where
    A: Kernel,
    B: Kernel,
    C: Kernel,
{
    type Output = ProductKernel<Self, C>;

    fn mul(self, rhs: C) -> Self::Output {
        ProductKernel::new(self, rhs)
    }
}

impl<A, B, C> std::ops::Add<C> for AddKernel<A, B>
where
    A: Kernel,
    B: Kernel,
    C: Kernel,
{
    type Output = AddKernel<Self, C>;

    fn add(self, rhs: C) -> Self::Output {
        AddKernel::new(self, rhs)
    }
}

impl<A, B> AddKernel<A, B>
where
    A: Kernel,
    B: Kernel,
{
    /// Construct a new Kernel from two other Kernels
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A, B> Kernel for AddKernel<A, B>
where
    A: Kernel,
    B: Kernel,
{
    fn compute(&self, x1: &[f64], x2: &[f64]) -> f64 {
        self.a.compute(x1, x2) + self.b.compute(x1, x2)
    }

    fn is_stationary(&self) -> bool {
        self.a.is_stationary() && self.b.is_stationary()
    }

    fn parameters(&self) -> KernelParameters {
        merge_parameters(self.a.parameters(), self.b.parameters())
    }

    fn set_parameter(
        &mut self,
        name: &str,
        value: f64,
    ) -> Result<(), KernelError> {
        set_composite_parameter(&mut self.a, &mut self.b, name, value)
    }
}

/// Kernel representing the product of two other kernels
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct ProductKernel<A, B>
where
    A: Kernel,
    B: Kernel,
{
    a: A,
    b: B,
}

impl<A, B> ProductKernel<A, B>
where
    A: Kernel,
    B: Kernel,
{
    /// Construct a new Kernel from two other Kernels
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A, B, C> std::ops::Mul<C> for ProductKernel<A, B>
where
    A: Kernel,
    B: Kernel,
    C: Kernel,
{
    type Output = ProductKernel<Self, C>;

    fn mul(self, rhs: C) -> Self::Output {
        ProductKernel::new(self, rhs)
    }
}

impl<A, B, C> std::ops::Add<C> for ProductKernel<A, B>
where
    A: Kernel,
    B: Kernel,
    C: Kernel,
{
    type Output = AddKernel<Self, C>;

    fn add(self, rhs: C) -> Self::Output {
        AddKernel::new(self, rhs)
    }
}

impl<A, B> Kernel for ProductKernel<A, B>
where
    A: Kernel,
    B: Kernel,
{
    fn compute(&self, x1: &[f64], x2: &[f64]) -> f64 {
        self.a.compute(x1, x2) * self.b.compute(x1, x2)
    }

    fn is_stationary(&self) -> bool {
        self.a.is_stationary() && self.b.is_stationary()
    }

    fn parameters(&self) -> KernelParameters {
        merge_parameters(self.a.parameters(), self.b.parameters())
    }

    fn set_parameter(
        &mut self,
        name: &str,
        value: f64,
    ) -> Result<(), KernelError> {
        set_composite_parameter(&mut self.a, &mut self.b, name, value)
    }
}
