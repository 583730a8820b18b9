/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Error classification, retry quota and retry strategies.

pub mod classifiers;
pub mod quota;
pub mod strategy;
