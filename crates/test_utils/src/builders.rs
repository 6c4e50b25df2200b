//! Test data builders
//!
//! Builders construct records with sensible defaults so tests specify
//! only the fields they care about.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{
    AppointmentId, BedId, BillId, InventoryItemId, LabOrderId, Money, PatientId, PrescriptionId,
    StaffId, TimeSlot, Uhid,
};
use rust_decimal_macros::dec;

use domain_records::{
    Appointment, AppointmentStatus, AppointmentType, Bed, BedRequestStatus, BedStatus,
    EmbeddedBill, InventoryItem, LabOrder, LabOrderStatus, LabTest, Patient, PatientStatus,
    PrescribedMedicine, Prescription, PrescriptionStatus, ServiceType,
};

use crate::fixtures::TemporalFixtures;

/// Builder for patient records
pub struct PatientBuilder {
    patient: Patient,
}

impl Default for PatientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientBuilder {
    pub fn new() -> Self {
        Self {
            patient: Patient {
                id: PatientId::new(),
                uhid: Uhid::generate(TemporalFixtures::day0(), 1),
                name: "Asha Rao".to_string(),
                age: Some(34),
                gender: None,
                phone: None,
                status: PatientStatus::Stable,
                assigned_bed: None,
                bed_assigned_at: None,
                bed_rate_per_day: None,
                admission_date: None,
                discharge_initiated: false,
                discharge_initiated_by: None,
                discharge_initiated_at: None,
                discharge_completed: false,
                discharge_completed_at: None,
                bills: Vec::new(),
                created_at: TemporalFixtures::day0(),
            },
        }
    }

    pub fn id(mut self, id: PatientId) -> Self {
        self.patient.id = id;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.patient.name = name.into();
        self
    }

    pub fn status(mut self, status: PatientStatus) -> Self {
        self.patient.status = status;
        self
    }

    /// Admits the patient to a bed number at a given instant and rate
    pub fn admitted(
        mut self,
        bed_number: impl Into<String>,
        assigned_at: DateTime<Utc>,
        rate_per_day: Money,
    ) -> Self {
        self.patient.status = PatientStatus::Admitted;
        self.patient.assigned_bed = Some(bed_number.into());
        self.patient.bed_assigned_at = Some(assigned_at);
        self.patient.admission_date = Some(assigned_at);
        self.patient.bed_rate_per_day = Some(rate_per_day);
        self
    }

    /// Marks discharge as initiated by a doctor
    pub fn discharge_initiated(mut self, doctor: StaffId, at: DateTime<Utc>) -> Self {
        self.patient.discharge_initiated = true;
        self.patient.discharge_initiated_by = Some(doctor);
        self.patient.discharge_initiated_at = Some(at);
        self
    }

    /// Adds a legacy embedded charge
    pub fn embedded_bill(
        mut self,
        description: impl Into<String>,
        amount: Money,
        service_type: Option<ServiceType>,
        paid: bool,
    ) -> Self {
        self.patient.bills.push(EmbeddedBill {
            description: description.into(),
            amount,
            paid,
            service_type,
            linked_bill_id: None,
        });
        self
    }

    /// Adds a legacy embedded charge mirroring a normalized bill
    pub fn embedded_bill_linked(
        mut self,
        description: impl Into<String>,
        amount: Money,
        linked_bill_id: BillId,
    ) -> Self {
        self.patient.bills.push(EmbeddedBill {
            description: description.into(),
            amount,
            paid: false,
            service_type: None,
            linked_bill_id: Some(linked_bill_id.to_string()),
        });
        self
    }

    pub fn build(self) -> Patient {
        self.patient
    }
}

/// Builder for bed records
pub struct BedBuilder {
    bed: Bed,
}

impl Default for BedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BedBuilder {
    pub fn new() -> Self {
        Self {
            bed: Bed {
                id: BedId::new(),
                number: "101".to_string(),
                ward: "General".to_string(),
                floor: Some("1".to_string()),
                bed_type: Some("general".to_string()),
                status: BedStatus::Available,
                patient_id: None,
                patient_name: None,
            },
        }
    }

    pub fn id(mut self, id: BedId) -> Self {
        self.bed.id = id;
        self
    }

    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.bed.number = number.into();
        self
    }

    pub fn status(mut self, status: BedStatus) -> Self {
        self.bed.status = status;
        self
    }

    pub fn occupied_by(mut self, patient: &Patient) -> Self {
        self.bed.status = BedStatus::Occupied;
        self.bed.patient_id = Some(patient.id);
        self.bed.patient_name = Some(patient.name.clone());
        self
    }

    pub fn build(self) -> Bed {
        self.bed
    }
}

/// Builder for appointment records
pub struct AppointmentBuilder {
    appointment: Appointment,
}

impl AppointmentBuilder {
    pub fn for_patient(patient: &Patient) -> Self {
        Self {
            appointment: Appointment {
                id: AppointmentId::new(),
                patient_id: patient.id,
                patient_name: Some(patient.name.clone()),
                doctor_id: StaffId::new(),
                doctor_name: Some("Dr. Mehta".to_string()),
                appointment_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
                time_slot: "09:00-09:30".parse().unwrap(),
                appointment_type: AppointmentType::Consultation,
                status: AppointmentStatus::Scheduled,
                queue_number: 1,
                bill_id: None,
                bed_requested: false,
                bed_request_status: None,
                created_at: TemporalFixtures::day0(),
            },
        }
    }

    pub fn doctor(mut self, doctor: StaffId) -> Self {
        self.appointment.doctor_id = doctor;
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.appointment.appointment_date = date;
        self
    }

    pub fn slot(mut self, slot: TimeSlot) -> Self {
        self.appointment.time_slot = slot;
        self
    }

    pub fn appointment_type(mut self, appointment_type: AppointmentType) -> Self {
        self.appointment.appointment_type = appointment_type;
        self
    }

    pub fn status(mut self, status: AppointmentStatus) -> Self {
        self.appointment.status = status;
        self
    }

    pub fn completed(mut self) -> Self {
        self.appointment.status = AppointmentStatus::Completed;
        self
    }

    pub fn billed(mut self, bill_id: BillId) -> Self {
        self.appointment.bill_id = Some(bill_id);
        self
    }

    pub fn bed_request(mut self, status: BedRequestStatus) -> Self {
        self.appointment.bed_requested = true;
        self.appointment.bed_request_status = Some(status);
        self
    }

    pub fn build(self) -> Appointment {
        self.appointment
    }
}

/// Builder for prescription records
pub struct PrescriptionBuilder {
    prescription: Prescription,
}

impl PrescriptionBuilder {
    pub fn for_patient(patient: &Patient) -> Self {
        Self {
            prescription: Prescription {
                id: PrescriptionId::new(),
                patient_id: patient.id,
                doctor_id: StaffId::new(),
                status: PrescriptionStatus::Dispensed,
                dispensed_from_hospital: true,
                medicines: Vec::new(),
                created_at: TemporalFixtures::day0(),
            },
        }
    }

    pub fn status(mut self, status: PrescriptionStatus) -> Self {
        self.prescription.status = status;
        self
    }

    pub fn external(mut self) -> Self {
        self.prescription.dispensed_from_hospital = false;
        self
    }

    pub fn medicine(mut self, name: impl Into<String>, quantity: u32) -> Self {
        self.prescription.medicines.push(PrescribedMedicine {
            name: name.into(),
            dosage: Some("1-0-1".to_string()),
            quantity,
        });
        self
    }

    pub fn build(self) -> Prescription {
        self.prescription
    }
}

/// Builder for lab order records
pub struct LabOrderBuilder {
    order: LabOrder,
}

impl LabOrderBuilder {
    pub fn for_patient(patient: &Patient) -> Self {
        Self {
            order: LabOrder {
                id: LabOrderId::new(),
                patient_id: patient.id,
                tests: Vec::new(),
                total_amount: Money::inr(dec!(0)),
                status: LabOrderStatus::Completed,
                bill_generated: false,
                created_at: TemporalFixtures::day0(),
            },
        }
    }

    pub fn test(mut self, name: impl Into<String>, price: Money) -> Self {
        self.order.tests.push(LabTest {
            name: name.into(),
            price,
        });
        self.order.total_amount = self.order.total_amount + price;
        self
    }

    pub fn status(mut self, status: LabOrderStatus) -> Self {
        self.order.status = status;
        self
    }

    pub fn bill_generated(mut self) -> Self {
        self.order.bill_generated = true;
        self
    }

    pub fn build(self) -> LabOrder {
        self.order
    }
}

/// Builder for inventory items
pub struct InventoryItemBuilder {
    item: InventoryItem,
}

impl InventoryItemBuilder {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            item: InventoryItem {
                id: InventoryItemId::new(),
                name: name.into(),
                category: Some("pharmacy".to_string()),
                unit_price: Money::inr(dec!(10)),
                stock: 100,
            },
        }
    }

    pub fn unit_price(mut self, price: Money) -> Self {
        self.item.unit_price = price;
        self
    }

    pub fn build(self) -> InventoryItem {
        self.item
    }
}
